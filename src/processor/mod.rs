// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Measurement processing for vertical float gauges
//!
//! Turns a captured image into a [`GaugeMeasurement`](crate::service::GaugeMeasurement):
//! - lazy camera-config reconciliation with the service
//! - image upload and bounded-backoff polling for the result

pub mod config_sync;
pub mod errors;
pub mod poller;

pub use config_sync::{CameraConfigSynchronizer, DeviceBinding, ResyncPolicy};
pub use errors::MeasurementError;
pub use poller::{MeasurementOutcome, MeasurementPoller, PollSchedule, MEASUREMENT_PROCESS_DELAYS};
