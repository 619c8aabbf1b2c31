// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image acquisition with flash coordination and capture retries

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::source::{CameraSource, CaptureError, FlashSwitch};

/// Longest time to wait for the flash to confirm it is on
pub const FLASH_DELAY_SECONDS: u64 = 60;

/// Number of capture attempts per cycle
pub const IMAGE_GET_RETRIES: u32 = 3;

/// Time budget for a single capture attempt
pub const GRAB_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures of the acquisition stage; no measurement is attempted after these
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("No camera configured, cannot grab image")]
    NoCameraConfigured,

    #[error("No image received from {camera} after {attempts} attempts")]
    NoImageCaptured {
        /// Camera reference that was tried
        camera: String,
        /// Number of attempts made
        attempts: u32,
    },
}

/// Timing and retry settings for image acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Flash confirmation budget in seconds
    pub flash_delay_secs: u64,
    /// Interval between flash state checks in milliseconds
    pub flash_poll_interval_ms: u64,
    /// Capture attempts per cycle
    pub image_get_retries: u32,
    /// Per-attempt capture timeout in seconds
    pub grab_timeout_secs: u64,
}

impl CaptureSettings {
    pub fn flash_delay(&self) -> Duration {
        Duration::from_secs(self.flash_delay_secs)
    }

    pub fn flash_poll_interval(&self) -> Duration {
        Duration::from_millis(self.flash_poll_interval_ms)
    }

    pub fn grab_timeout(&self) -> Duration {
        Duration::from_secs(self.grab_timeout_secs)
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            flash_delay_secs: FLASH_DELAY_SECONDS,
            flash_poll_interval_ms: 1000,
            image_get_retries: IMAGE_GET_RETRIES,
            grab_timeout_secs: GRAB_TIMEOUT.as_secs(),
        }
    }
}

/// Grabs images from a camera, lighting the gauge with a flash if one is set
pub struct ImageGrabber {
    camera: Arc<dyn CameraSource>,
    flash: Arc<dyn FlashSwitch>,
    camera_ref: Option<String>,
    flash_ref: Option<String>,
    settings: CaptureSettings,
}

impl ImageGrabber {
    pub fn new(
        camera: Arc<dyn CameraSource>,
        flash: Arc<dyn FlashSwitch>,
        camera_ref: Option<String>,
        flash_ref: Option<String>,
    ) -> Self {
        Self {
            camera,
            flash,
            camera_ref,
            flash_ref,
            settings: CaptureSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CaptureSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn camera_ref(&self) -> Option<&str> {
        self.camera_ref.as_deref()
    }

    pub fn flash_ref(&self) -> Option<&str> {
        self.flash_ref.as_deref()
    }

    /// Capture one image
    ///
    /// The flash, when configured, is switched on first and always switched
    /// off again afterwards, whether or not the capture worked.
    pub async fn acquire(&self) -> Result<Vec<u8>, AcquisitionError> {
        let camera_ref = match self.camera_ref.as_deref() {
            Some(camera_ref) => camera_ref,
            None => {
                error!("No camera entity id was set, cannot grab image");
                return Err(AcquisitionError::NoCameraConfigured);
            }
        };

        if let Some(flash_ref) = self.flash_ref.as_deref() {
            self.flash_on(flash_ref).await;
        }
        let image = self.capture_with_retries(camera_ref).await;
        if let Some(flash_ref) = self.flash_ref.as_deref() {
            self.flash_off(flash_ref).await;
        }

        image.ok_or_else(|| {
            error!("No image was received, aborting capture");
            AcquisitionError::NoImageCaptured {
                camera: camera_ref.to_string(),
                attempts: self.settings.image_get_retries,
            }
        })
    }

    async fn capture_with_retries(&self, camera_ref: &str) -> Option<Vec<u8>> {
        let timeout = self.settings.grab_timeout();
        for attempt in 1..=self.settings.image_get_retries {
            let result = tokio::time::timeout(timeout, self.camera.capture(camera_ref))
                .await
                .unwrap_or(Err(CaptureError::Timeout(timeout)));
            match result {
                Ok(bytes) if !bytes.is_empty() => {
                    debug!(
                        "Image received from {} on attempt {}: {} bytes",
                        camera_ref,
                        attempt,
                        bytes.len()
                    );
                    return Some(bytes);
                }
                Ok(_) => {
                    warn!("Error number {} on receive image: empty image", attempt);
                }
                Err(e) => {
                    warn!("Error number {} on receive image: {}", attempt, e);
                }
            }
        }
        None
    }

    /// Switch the flash on and wait for it to confirm
    ///
    /// Returns whether the on-state was observed. Not observing it is only a
    /// warning: the capture goes ahead either way.
    async fn flash_on(&self, flash_ref: &str) -> bool {
        if let Err(e) = self.flash.turn_on(flash_ref).await {
            warn!("Failed to turn on flash {}: {}", flash_ref, e);
            return false;
        }
        debug!("Waiting for flash to turn on");

        let budget = self.settings.flash_delay();
        let interval = self.settings.flash_poll_interval();
        let mut waited = Duration::ZERO;
        while waited < budget {
            match self.flash.is_on(flash_ref).await {
                Ok(true) => {
                    info!("Flash turned on after {} seconds", waited.as_secs());
                    return true;
                }
                Ok(false) => {
                    debug!(
                        "Flash state is off, {} seconds passed",
                        waited.as_secs()
                    );
                }
                Err(e) => {
                    warn!("Could not read flash state for {}: {}", flash_ref, e);
                    break;
                }
            }
            tokio::time::sleep(interval).await;
            waited += interval;
        }
        warn!("Flash did not turn on after {} seconds", waited.as_secs());
        false
    }

    async fn flash_off(&self, flash_ref: &str) {
        match self.flash.turn_off(flash_ref).await {
            Ok(()) => debug!("Flash turned off"),
            Err(e) => warn!("Failed to turn off flash {}: {}", flash_ref, e),
        }
    }
}
