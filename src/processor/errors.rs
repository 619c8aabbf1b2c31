// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the measurement stage of a cycle

use thiserror::Error;

use crate::service::ServiceError;

/// Failures while turning an uploaded image into a measurement
///
/// Every variant is fatal for the current cycle only; the next cycle starts
/// from scratch (and retries config sync if it never completed).
#[derive(Debug, Error)]
pub enum MeasurementError {
    /// Config sync or device lookup could not reach a usable answer
    #[error("IndiCam service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The image upload returned no image id
    #[error("Image upload failed for device {device}: {reason}")]
    UploadFailed {
        /// Device the image was uploaded for
        device: String,
        /// Underlying failure
        reason: String,
    },

    /// The service reported the image as processed but returned no result
    #[error("Measurement unavailable for image {image_id}: {reason}")]
    MeasurementUnavailable {
        /// Service image id
        image_id: u64,
        /// Underlying failure
        reason: String,
    },

    /// The poll schedule ran out before the service finished processing
    #[error("Timed out waiting for measurement of image {image_id} after {attempts} checks")]
    MeasurementTimeout {
        /// Service image id
        image_id: u64,
        /// Number of readiness checks performed
        attempts: usize,
    },

    /// The service returned a measurement without a reading
    #[error("Measurement for image {image_id} carries no value")]
    InvalidMeasurement {
        /// Service image id
        image_id: u64,
    },
}

impl MeasurementError {
    pub(crate) fn unavailable(context: &str, err: &ServiceError) -> Self {
        MeasurementError::ServiceUnavailable(format!("{}: {}", context, err))
    }
}
