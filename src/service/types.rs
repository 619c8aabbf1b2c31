// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types shared between the IndiCam service client and the processors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera calibration offsets, as fractions of the gauge body height
///
/// `min_perc` marks the "empty" line measured up from the bottom of the body,
/// `max_perc` the "full" line measured down from the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CamConfig {
    #[serde(rename = "empty_perc_from_bottom")]
    pub min_perc: f64,
    #[serde(rename = "full_perc_from_top")]
    pub max_perc: f64,
}

impl CamConfig {
    pub fn new(min_perc: f64, max_perc: f64) -> Self {
        Self { min_perc, max_perc }
    }
}

impl Default for CamConfig {
    fn default() -> Self {
        Self {
            min_perc: 0.0,
            max_perc: 0.0,
        }
    }
}

/// A measurement extracted by the service from one uploaded image
///
/// All coordinates are pixel positions in the uploaded image. `value` is the
/// normalized reading (0..1); it is unset when the service could not read
/// the gauge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeMeasurement {
    #[serde(rename = "gauge_left_col")]
    pub body_left: i64,
    #[serde(rename = "gauge_right_col")]
    pub body_right: i64,
    #[serde(rename = "gauge_top_row")]
    pub body_top: i64,
    #[serde(rename = "gauge_bottom_row")]
    pub body_bottom: i64,
    #[serde(rename = "float_top_col")]
    pub float_top: i64,
    #[serde(default)]
    pub value: Option<f64>,
}

impl GaugeMeasurement {
    /// Gauge body height in pixels (bottom row minus top row)
    pub fn body_height(&self) -> i64 {
        self.body_bottom.saturating_sub(self.body_top)
    }

    /// Gauge body width in pixels (right column minus left column)
    pub fn body_width(&self) -> i64 {
        self.body_right.saturating_sub(self.body_left)
    }
}

/// Result of probing the service with the configured credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Ok,
    AuthFailed,
    Failed,
}

/// Errors surfaced by the service client
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be sent or no response arrived in time
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service rejected the credentials
    #[error("Authentication rejected by service (status {status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// The service answered with a non-success status
    #[error("Service returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The requested resource does not exist at the service
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}
