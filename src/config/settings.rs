// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration: service account, host connection and gauge devices

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::capture::CaptureSettings;
use crate::processor::{PollSchedule, ResyncPolicy, MEASUREMENT_PROCESS_DELAYS};
use crate::service::{CamConfig, DEFAULT_SERVICE_URL, HTTP_TIMEOUT};

/// Default time between measurements of a device
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Shortest allowed time between measurements of a device
pub const MIN_SCAN_INTERVAL_SECS: u64 = 4 * 60 * 60;

/// Default Home Assistant URL
pub const DEFAULT_HOST_URL: &str = "http://localhost:8123";

/// IndiCam service account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub url: String,
    pub auth_key: String,
    pub request_timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            auth_key: String::new(),
            request_timeout_secs: HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl ServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Home Assistant connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    pub url: String,
    pub token: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_HOST_URL.to_string(),
            token: String::new(),
        }
    }
}

/// One gauge, its camera and its calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Sensor name
    pub name: String,
    /// Device handle registered with the IndiCam service
    pub service_device: String,
    pub camera_entity_id: Option<String>,
    pub flash_entity_id: Option<String>,
    /// Empty line, as a fraction of body height from the bottom
    #[serde(default)]
    pub min_perc: f64,
    /// Full line, as a fraction of body height from the top
    #[serde(default)]
    pub max_perc: f64,
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_scan_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

impl DeviceSettings {
    pub fn cam_config(&self) -> CamConfig {
        CamConfig::new(self.min_perc, self.max_perc)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Device name must not be empty".to_string());
        }
        if self.service_device.trim().is_empty() {
            return Err(format!("Device {}: service_device must not be empty", self.name));
        }
        for (label, value) in [("min_perc", self.min_perc), ("max_perc", self.max_perc)] {
            if !(0.0..1.0).contains(&value) {
                return Err(format!(
                    "Device {}: {} must be between 0 and 1, got {}",
                    self.name, label, value
                ));
            }
        }
        if self.min_perc + self.max_perc >= 1.0 {
            return Err(format!(
                "Device {}: min_perc + max_perc must be below 1",
                self.name
            ));
        }
        if self.scan_interval_secs < MIN_SCAN_INTERVAL_SECS {
            return Err(format!(
                "Device {}: scan interval {}s is below the minimum of {}s",
                self.name, self.scan_interval_secs, MIN_SCAN_INTERVAL_SECS
            ));
        }
        Ok(())
    }
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicamConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub host: HostSettings,
    /// Where snapshot and measure images are written; none disables them
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub resync_policy: ResyncPolicy,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default = "default_poll_schedule_secs")]
    pub poll_schedule_secs: Vec<u64>,
    #[serde(default)]
    pub devices: Vec<DeviceSettings>,
}

fn default_poll_schedule_secs() -> Vec<u64> {
    MEASUREMENT_PROCESS_DELAYS.to_vec()
}

impl Default for IndicamConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            host: HostSettings::default(),
            output_dir: None,
            resync_policy: ResyncPolicy::default(),
            capture: CaptureSettings::default(),
            poll_schedule_secs: default_poll_schedule_secs(),
            devices: Vec::new(),
        }
    }
}

impl IndicamConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load a file, apply `.env` and environment overrides, then validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let path = path.as_ref();
        let mut config = Self::from_file(path)?;
        config.apply_env();
        config.validate().map_err(|e| anyhow!(e))?;
        info!(
            "Loaded configuration from {}: {} device(s)",
            path.display(),
            config.devices.len()
        );
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Override settings from any key lookup
    ///
    /// Recognised keys: `INDICAM_URL`, `INDICAM_AUTH_KEY`, `INDICAM_PATH_OUT`,
    /// `HASS_URL` and `HASS_TOKEN`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("INDICAM_URL") {
            self.service.url = url;
        }
        if let Some(key) = get("INDICAM_AUTH_KEY") {
            self.service.auth_key = key;
        }
        if let Some(path) = get("INDICAM_PATH_OUT") {
            self.output_dir = Some(PathBuf::from(path));
        }
        if let Some(url) = get("HASS_URL") {
            self.host.url = url;
        }
        if let Some(token) = get("HASS_TOKEN") {
            self.host.token = token;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.service.auth_key.trim().is_empty() {
            return Err("IndiCam auth key must not be empty".to_string());
        }
        url::Url::parse(&self.service.url)
            .map_err(|e| format!("Invalid IndiCam URL {}: {}", self.service.url, e))?;
        url::Url::parse(&self.host.url)
            .map_err(|e| format!("Invalid Home Assistant URL {}: {}", self.host.url, e))?;
        if self.service.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.poll_schedule_secs.is_empty() {
            return Err("Poll schedule must not be empty".to_string());
        }
        if self.capture.image_get_retries == 0 {
            return Err("Image capture retries must be greater than 0".to_string());
        }
        if self.capture.flash_poll_interval_ms == 0 {
            return Err("Flash poll interval must be greater than 0".to_string());
        }

        let mut names = HashSet::new();
        for device in &self.devices {
            device.validate()?;
            if !names.insert(device.name.as_str()) {
                return Err(format!("Duplicate device name: {}", device.name));
            }
        }
        Ok(())
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::from_secs(&self.poll_schedule_secs)
    }

    pub fn device(&self, name: &str) -> Option<&DeviceSettings> {
        self.devices.iter().find(|d| d.name == name)
    }
}
