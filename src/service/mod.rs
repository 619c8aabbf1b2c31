// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! IndiCam image-analysis service access
//!
//! - [`IndicamService`]: the contract the processors consume
//! - [`HttpIndicamClient`]: REST implementation against the hosted service

pub mod client;
pub mod http;
pub mod types;

pub use client::IndicamService;
pub use http::{HttpIndicamClient, DEFAULT_SERVICE_URL, HTTP_TIMEOUT};
pub use types::{CamConfig, ConnectStatus, GaugeMeasurement, ServiceError};
