// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! IndiCam service client trait definition

use async_trait::async_trait;

use super::types::{CamConfig, ConnectStatus, GaugeMeasurement, ServiceError};

/// Trait for clients of the IndiCam image-analysis service
///
/// One client is shared by every configured device, so implementations must
/// keep no per-call state. Every call is bounded by the client's request
/// timeout; failures come back as [`ServiceError`] and never panic.
#[async_trait]
pub trait IndicamService: Send + Sync {
    /// Look up the service's numeric id for a device handle
    async fn resolve_device_id(&self, device_name: &str) -> Result<u64, ServiceError>;

    /// Fetch the camera configuration currently active at the service
    async fn get_camera_config(&self, indicam_id: u64) -> Result<CamConfig, ServiceError>;

    /// Create a new camera configuration at the service
    async fn set_camera_config(
        &self,
        indicam_id: u64,
        config: &CamConfig,
    ) -> Result<(), ServiceError>;

    /// Upload a JPEG image for processing, returning the service's image id
    async fn upload_image(&self, device_name: &str, image: &[u8]) -> Result<u64, ServiceError>;

    /// Check whether processing of an uploaded image has finished
    async fn measurement_ready(&self, image_id: u64) -> Result<bool, ServiceError>;

    /// Fetch the measurement extracted from an uploaded image
    async fn get_measurement(&self, image_id: u64) -> Result<GaugeMeasurement, ServiceError>;

    /// Probe the service with the configured credentials
    async fn test_connect(&self) -> ConnectStatus {
        ConnectStatus::Ok
    }
}
