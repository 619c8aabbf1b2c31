// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload-and-poll protocol for vertical float gauges
//!
//! One poller exists per configured device. A call to [`MeasurementPoller::measure`]
//! reconciles the camera config (lazily), uploads the image, then walks a
//! fixed backoff schedule asking the service whether processing finished.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config_sync::{CameraConfigSynchronizer, DeviceBinding, ResyncPolicy};
use super::errors::MeasurementError;
use crate::service::{CamConfig, GaugeMeasurement, IndicamService};

/// Default wait, in seconds, after each unsuccessful readiness check
pub const MEASUREMENT_PROCESS_DELAYS: [u64; 5] = [1, 5, 25, 60, 90];

/// Ordered wait durations between readiness checks
///
/// The schedule is consumed front to back and never adapts; its length is the
/// maximum number of readiness checks per image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    delays: Vec<Duration>,
}

impl PollSchedule {
    pub fn from_secs(secs: &[u64]) -> Self {
        Self {
            delays: secs.iter().map(|s| Duration::from_secs(*s)).collect(),
        }
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Worst-case time spent waiting when the service never becomes ready
    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::from_secs(&MEASUREMENT_PROCESS_DELAYS)
    }
}

/// Result of one measurement attempt, with the time it took
#[derive(Debug)]
pub struct MeasurementOutcome {
    pub result: Result<GaugeMeasurement, MeasurementError>,
    pub elapsed: Duration,
}

impl MeasurementOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Turns uploaded images into measurements for a single device
pub struct MeasurementPoller {
    service: Arc<dyn IndicamService>,
    binding: DeviceBinding,
    cam_config: CamConfig,
    sync: CameraConfigSynchronizer,
    schedule: PollSchedule,
}

impl MeasurementPoller {
    pub fn new(
        service: Arc<dyn IndicamService>,
        device_name: impl Into<String>,
        cam_config: CamConfig,
    ) -> Self {
        Self {
            service,
            binding: DeviceBinding::new(device_name),
            cam_config,
            sync: CameraConfigSynchronizer::new(ResyncPolicy::Once),
            schedule: PollSchedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_resync_policy(mut self, policy: ResyncPolicy) -> Self {
        self.sync = CameraConfigSynchronizer::new(policy);
        self
    }

    pub fn device_name(&self) -> &str {
        self.binding.device_name()
    }

    pub fn cam_config(&self) -> &CamConfig {
        &self.cam_config
    }

    /// Replace the local camera configuration
    ///
    /// Under [`ResyncPolicy::Once`] an already reconciled config is not
    /// pushed again; call [`MeasurementPoller::invalidate_sync`] to force it.
    pub fn set_cam_config(&mut self, cam_config: CamConfig) {
        self.cam_config = cam_config;
    }

    pub fn invalidate_sync(&mut self) {
        self.sync.invalidate();
    }

    pub fn is_synced(&self) -> bool {
        self.sync.is_synced(&self.cam_config)
    }

    /// Upload an image and wait for the service to measure it
    pub async fn measure(&mut self, image: &[u8]) -> MeasurementOutcome {
        let start = Instant::now();
        let result = self.run(image).await;
        let elapsed = start.elapsed();
        if let Err(ref e) = result {
            error!(device = %self.binding.device_name(), "Measurement failed: {}", e);
        }
        MeasurementOutcome { result, elapsed }
    }

    async fn run(&mut self, image: &[u8]) -> Result<GaugeMeasurement, MeasurementError> {
        self.sync
            .ensure_synced(self.service.as_ref(), &mut self.binding, &self.cam_config)
            .await?;

        let device = self.binding.device_name().to_string();
        let image_id = self
            .service
            .upload_image(&device, image)
            .await
            .map_err(|e| MeasurementError::UploadFailed {
                device: device.clone(),
                reason: e.to_string(),
            })?;
        info!(device = %device, "Uploaded image: image_id={}, bytes={}", image_id, image.len());

        for (attempt, delay) in self.schedule.delays().iter().enumerate() {
            let ready = match self.service.measurement_ready(image_id).await {
                Ok(ready) => ready,
                Err(e) => {
                    warn!(
                        "Readiness check {} failed for image_id={}: {}",
                        attempt + 1,
                        image_id,
                        e
                    );
                    false
                }
            };
            if !ready {
                debug!(
                    "Measurement not ready: image_id={}, waiting {:?}",
                    image_id, delay
                );
                tokio::time::sleep(*delay).await;
                continue;
            }

            let measurement = self.service.get_measurement(image_id).await.map_err(|e| {
                MeasurementError::MeasurementUnavailable {
                    image_id,
                    reason: e.to_string(),
                }
            })?;
            if measurement.value.is_none() {
                return Err(MeasurementError::InvalidMeasurement { image_id });
            }
            return Ok(measurement);
        }

        Err(MeasurementError::MeasurementTimeout {
            image_id,
            attempts: self.schedule.len(),
        })
    }
}
