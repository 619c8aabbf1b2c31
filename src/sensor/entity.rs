// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gauge sensor: the per-device record and its measurement cycle

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use super::payload::{slugify, MeasurementEvent, SensorAttributes, SensorState};
use crate::annotate::ResultAnnotator;
use crate::capture::{AcquisitionError, ImageGrabber};
use crate::processor::{MeasurementError, MeasurementPoller};
use crate::service::GaugeMeasurement;

/// Why a cycle produced no new measurement
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Measurement(#[from] MeasurementError),
}

/// One gauge, read through a camera
///
/// Holds the last good measurement. [`GaugeSensor::update`] runs a full
/// cycle; a failed cycle leaves the previous measurement in place.
pub struct GaugeSensor {
    name: String,
    entity_id: String,
    grabber: ImageGrabber,
    poller: MeasurementPoller,
    annotator: ResultAnnotator,
    last_result: Option<GaugeMeasurement>,
    last_elapsed: Option<Duration>,
    last_measured: Option<DateTime<Utc>>,
}

impl GaugeSensor {
    pub fn new(
        name: impl Into<String>,
        grabber: ImageGrabber,
        poller: MeasurementPoller,
        annotator: ResultAnnotator,
    ) -> Self {
        let name = name.into();
        let entity_id = format!("sensor.{}", slugify(&name));
        Self {
            name,
            entity_id,
            grabber,
            poller,
            annotator,
            last_result: None,
            last_elapsed: None,
            last_measured: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn last_result(&self) -> Option<&GaugeMeasurement> {
        self.last_result.as_ref()
    }

    pub fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    pub fn poller(&self) -> &MeasurementPoller {
        &self.poller
    }

    pub fn poller_mut(&mut self) -> &mut MeasurementPoller {
        &mut self.poller
    }

    /// Fill level in percent, one decimal
    pub fn native_value(&self) -> Option<f64> {
        self.last_result
            .as_ref()
            .and_then(|msr| msr.value)
            .map(|value| (value * 1000.0).round() / 10.0)
    }

    pub fn attributes(&self) -> SensorAttributes {
        SensorAttributes {
            friendly_name: self.name.clone(),
            unit_of_measurement: "%".to_string(),
            device_class: "volume_storage".to_string(),
            state_class: "measurement".to_string(),
            gauge_measurement: self.last_result.clone(),
            last_measured: self.last_measured,
            processing_secs: self.last_elapsed.map(|d| d.as_secs_f64()),
        }
    }

    pub fn state(&self) -> SensorState {
        SensorState {
            state: self
                .native_value()
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "unknown".to_string()),
            attributes: self.attributes(),
        }
    }

    /// Event payload for the last measurement, if there is one
    pub fn measurement_event(&self) -> Option<MeasurementEvent> {
        self.last_result
            .as_ref()
            .map(|msr| MeasurementEvent::new(msr, self.entity_id.clone()))
    }

    /// Capture, measure and annotate once
    ///
    /// The diagnostic images are refreshed whenever an image was captured,
    /// including when the measurement failed.
    pub async fn update(&mut self) -> Result<GaugeMeasurement, CycleError> {
        info!(device = %self.name, "Grabbing gauge snapshot image");
        let image = self.grabber.acquire().await.map_err(|e| {
            error!(device = %self.name, "No image captured, skipping processing: {}", e);
            e
        })?;

        let outcome = self.poller.measure(&image).await;
        self.last_elapsed = Some(outcome.elapsed);
        info!(device = %self.name, "Image processing time: {:.3}s", outcome.elapsed.as_secs_f64());

        if let Err(e) = self
            .annotator
            .decorate_and_save(&image, outcome.result.as_ref().ok(), self.poller.cam_config())
            .await
        {
            warn!(device = %self.name, "Failed to save diagnostic images: {}", e);
        }

        match outcome.result {
            Ok(measurement) => {
                self.last_result = Some(measurement.clone());
                self.last_measured = Some(Utc::now());
                Ok(measurement)
            }
            Err(e) => {
                error!(
                    device = %self.name,
                    "Measurement extraction failed, keeping last measurement as state"
                );
                Err(e.into())
            }
        }
    }
}
