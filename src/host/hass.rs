// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Home Assistant REST client
//!
//! Provides the camera, flash and result sink used by gauge sensors on top
//! of the Home Assistant HTTP API.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::capture::{CameraSource, CaptureError, FlashSwitch};
use crate::sensor::{
    MeasurementEvent, MeasurementSink, PublishError, SensorState, INDICAM_MEASUREMENT_EVENT,
};

/// Timeout for state and service calls; captures use the grabber's own budget
pub const HOST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EntityTarget<'a> {
    entity_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct EntityState {
    state: String,
}

pub struct HomeAssistantClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl HomeAssistantClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(HOST_TIMEOUT).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Home Assistant client configured: url={}", base_url);

        Ok(Self {
            client,
            base_url,
            auth_header: format!("Bearer {}", token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(header::AUTHORIZATION, &self.auth_header)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(header::AUTHORIZATION, &self.auth_header)
    }

    async fn call_switch(&self, service: &str, entity_id: &str) -> Result<(), CaptureError> {
        let response = self
            .post(&format!("services/switch/{}", service))
            .json(&EntityTarget { entity_id })
            .send()
            .await?;
        expect_success(response).await.map_err(CaptureError::Request)?;
        debug!("Called switch.{} for {}", service, entity_id);
        Ok(())
    }
}

async fn expect_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status.as_u16(), body))
}

#[async_trait]
impl CameraSource for HomeAssistantClient {
    async fn capture(&self, camera_ref: &str) -> Result<Vec<u8>, CaptureError> {
        let response = self
            .get(&format!("camera_proxy/{}", camera_ref))
            .send()
            .await?;
        let response = expect_success(response)
            .await
            .map_err(CaptureError::Request)?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FlashSwitch for HomeAssistantClient {
    async fn turn_on(&self, flash_ref: &str) -> Result<(), CaptureError> {
        self.call_switch("turn_on", flash_ref).await
    }

    async fn turn_off(&self, flash_ref: &str) -> Result<(), CaptureError> {
        self.call_switch("turn_off", flash_ref).await
    }

    async fn is_on(&self, flash_ref: &str) -> Result<bool, CaptureError> {
        let response = self.get(&format!("states/{}", flash_ref)).send().await?;
        let response = expect_success(response)
            .await
            .map_err(CaptureError::Request)?;
        let state: EntityState = response
            .json()
            .await
            .map_err(|e| CaptureError::InvalidResponse(e.to_string()))?;
        Ok(state.state == "on")
    }
}

#[async_trait]
impl MeasurementSink for HomeAssistantClient {
    async fn publish_state(&self, entity_id: &str, state: &SensorState) -> Result<(), PublishError> {
        let response = self
            .post(&format!("states/{}", entity_id))
            .json(state)
            .send()
            .await?;
        reject_on_failure(response).await?;
        debug!("Published state {} = {}", entity_id, state.state);
        Ok(())
    }

    async fn fire_event(&self, event: &MeasurementEvent) -> Result<(), PublishError> {
        let response = self
            .post(&format!("events/{}", INDICAM_MEASUREMENT_EVENT))
            .json(event)
            .send()
            .await?;
        reject_on_failure(response).await?;
        debug!("Fired {} for {}", INDICAM_MEASUREMENT_EVENT, event.entity_id);
        Ok(())
    }
}

async fn reject_on_failure(response: Response) -> Result<(), PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let message = response.text().await.unwrap_or_default();
    Err(PublishError::Rejected {
        status: status.as_u16(),
        message,
    })
}
