// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Builds the running node from its configuration

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::annotate::ResultAnnotator;
use crate::capture::{CameraSource, FlashSwitch, ImageGrabber};
use crate::config::{DeviceSettings, IndicamConfig};
use crate::host::HomeAssistantClient;
use crate::processor::MeasurementPoller;
use crate::scheduler::Scheduler;
use crate::sensor::{GaugeSensor, MeasurementSink};
use crate::service::{ConnectStatus, HttpIndicamClient, IndicamService};

/// Assemble the sensor for one configured device
pub fn build_sensor(
    config: &IndicamConfig,
    device: &DeviceSettings,
    service: Arc<dyn IndicamService>,
    camera: Arc<dyn CameraSource>,
    flash: Arc<dyn FlashSwitch>,
) -> GaugeSensor {
    let grabber = ImageGrabber::new(
        camera,
        flash,
        device.camera_entity_id.clone(),
        device.flash_entity_id.clone(),
    )
    .with_settings(config.capture.clone());
    let poller = MeasurementPoller::new(service, device.service_device.clone(), device.cam_config())
        .with_schedule(config.poll_schedule())
        .with_resync_policy(config.resync_policy);
    let annotator = ResultAnnotator::new(config.output_dir.clone(), device.service_device.clone());

    GaugeSensor::new(device.name.clone(), grabber, poller, annotator)
}

/// The service client and host connection shared by every device
pub struct IndicamNode {
    config: IndicamConfig,
    service: Arc<dyn IndicamService>,
    host: Arc<HomeAssistantClient>,
}

impl IndicamNode {
    pub fn from_config(config: IndicamConfig) -> Result<Self> {
        let service = HttpIndicamClient::with_timeout(
            &config.service.url,
            &config.service.auth_key,
            config.service.request_timeout(),
        )
        .context("Failed to create IndiCam client")?;
        let host = HomeAssistantClient::new(&config.host.url, &config.host.token)
            .context("Failed to create Home Assistant client")?;

        Ok(Self {
            config,
            service: Arc::new(service),
            host: Arc::new(host),
        })
    }

    pub fn config(&self) -> &IndicamConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<dyn IndicamService> {
        self.service.clone()
    }

    pub fn sink(&self) -> Arc<dyn MeasurementSink> {
        self.host.clone()
    }

    /// Probe the service; anything but `Ok` is an error
    pub async fn check_connection(&self) -> Result<()> {
        match self.service.test_connect().await {
            ConnectStatus::Ok => {
                info!("Connected to IndiCam service at {}", self.config.service.url);
                Ok(())
            }
            ConnectStatus::AuthFailed => Err(anyhow!(
                "IndiCam service rejected the auth key"
            )),
            ConnectStatus::Failed => Err(anyhow!(
                "Cannot connect to IndiCam service at {}",
                self.config.service.url
            )),
        }
    }

    pub fn sensor(&self, device: &DeviceSettings) -> GaugeSensor {
        build_sensor(
            &self.config,
            device,
            self.service.clone(),
            self.host.clone(),
            self.host.clone(),
        )
    }

    pub fn sensor_by_name(&self, name: &str) -> Result<GaugeSensor> {
        let device = self
            .config
            .device(name)
            .ok_or_else(|| anyhow!("No device named {} in configuration", name))?;
        Ok(self.sensor(device))
    }

    /// Start one measurement task per device
    pub fn start(&self) -> Scheduler {
        let mut scheduler = Scheduler::new(self.sink());
        for device in &self.config.devices {
            if device.camera_entity_id.is_none() {
                warn!(device = %device.name, "No camera entity configured, every cycle will fail");
            }
            scheduler.spawn(self.sensor(device), device.scan_interval());
        }
        if scheduler.device_count() == 0 {
            error!("No devices configured, nothing to measure");
        }
        scheduler
    }
}
