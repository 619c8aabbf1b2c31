// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Camera and flash abstractions used by the image grabber

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by camera and flash backends
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The backend could not be reached or answered with an error
    #[error("Device request failed: {0}")]
    Request(String),

    /// The backend answered, but not with something usable
    #[error("Unexpected device response: {0}")]
    InvalidResponse(String),

    /// The capture did not finish within its time budget
    #[error("Capture timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for CaptureError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CaptureError::Request(format!("timeout: {}", err))
        } else {
            CaptureError::Request(err.to_string())
        }
    }
}

/// A source of still images, addressed by a camera reference
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Take one picture and return the encoded image bytes
    async fn capture(&self, camera_ref: &str) -> Result<Vec<u8>, CaptureError>;
}

/// A switchable light used to illuminate the gauge during capture
#[async_trait]
pub trait FlashSwitch: Send + Sync {
    /// Request the flash to switch on
    async fn turn_on(&self, flash_ref: &str) -> Result<(), CaptureError>;

    /// Request the flash to switch off
    async fn turn_off(&self, flash_ref: &str) -> Result<(), CaptureError>;

    /// Whether the flash currently reports itself as on
    async fn is_on(&self, flash_ref: &str) -> Result<bool, CaptureError>;
}
