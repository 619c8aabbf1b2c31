// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! REST client for the IndiCam service
//!
//! Thin wrapper over the service's JSON API. Each call carries the account
//! token and the fixed request timeout; non-success statuses are mapped onto
//! [`ServiceError`] variants so the processors can decide what is fatal.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::client::IndicamService;
use super::types::{CamConfig, ConnectStatus, GaugeMeasurement, ServiceError};

/// Default IndiCam service URL
pub const DEFAULT_SERVICE_URL: &str = "https://app.hausnet.io/indicam/api";

/// Timeout applied to every service request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed implementation of [`IndicamService`]
pub struct HttpIndicamClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl HttpIndicamClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, api_key, HTTP_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("IndiCam client configured: url={}", base_url);

        Ok(Self {
            client,
            base_url,
            auth_header: format!("Token {}", api_key),
        })
    }

    /// The service base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
    }
}

/// Map a non-success response onto a [`ServiceError`]
async fn check_status(response: Response, what: &str) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::Unauthorized {
            status: status.as_u16(),
        });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound(what.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct DeviceRecord {
    id: u64,
}

#[derive(Debug, Serialize)]
struct CreateCamConfigRequest {
    indicam: u64,
    full_perc_from_top: f64,
    empty_perc_from_bottom: f64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    image_id: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessedResponse {
    processed: bool,
}

#[async_trait]
impl IndicamService for HttpIndicamClient {
    async fn resolve_device_id(&self, device_name: &str) -> Result<u64, ServiceError> {
        let response = self
            .get("indicams/")
            .query(&[("handle", device_name)])
            .send()
            .await?;
        let response = check_status(response, device_name).await.map_err(|e| {
            error!("Failed to find the indicam: handle={}, error={}", device_name, e);
            e
        })?;
        let records: Vec<DeviceRecord> = response.json().await?;
        records
            .first()
            .map(|r| r.id)
            .ok_or_else(|| ServiceError::NotFound(format!("indicam handle {}", device_name)))
    }

    async fn get_camera_config(&self, indicam_id: u64) -> Result<CamConfig, ServiceError> {
        let response = self
            .get(&format!("indicams/{}/camconfig_current", indicam_id))
            .send()
            .await?;
        let response = check_status(response, "camconfig").await.map_err(|e| {
            error!(
                "Unable to fetch camera config: indicam_id={}, error={}",
                indicam_id, e
            );
            e
        })?;
        let body = response.text().await?;
        serde_json::from_str::<CamConfig>(&body).map_err(|e| {
            error!("Invalid cam_config: json={}", body);
            ServiceError::InvalidResponse(e.to_string())
        })
    }

    async fn set_camera_config(
        &self,
        indicam_id: u64,
        config: &CamConfig,
    ) -> Result<(), ServiceError> {
        let request = CreateCamConfigRequest {
            indicam: indicam_id,
            full_perc_from_top: config.max_perc,
            empty_perc_from_bottom: config.min_perc,
        };
        let response = self.post("camconfigs/create").json(&request).send().await?;
        check_status(response, "camconfigs/create")
            .await
            .map_err(|e| {
                error!(
                    "Error creating camera config: indicam_id={}, error={}",
                    indicam_id, e
                );
                e
            })?;
        Ok(())
    }

    async fn upload_image(&self, device_name: &str, image: &[u8]) -> Result<u64, ServiceError> {
        let response = self
            .post(&format!("images/{}/upload/", device_name))
            .header(header::CONTENT_TYPE, "image/jpeg")
            .body(image.to_vec())
            .send()
            .await?;
        let response = check_status(response, "images/upload").await?;
        let upload: UploadResponse = response.json().await?;
        if let Some(message) = upload.error {
            error!("Image upload rejected: device={}, error={}", device_name, message);
            return Err(ServiceError::InvalidResponse(message));
        }
        upload
            .image_id
            .ok_or_else(|| ServiceError::InvalidResponse("no image_id in response".to_string()))
    }

    async fn measurement_ready(&self, image_id: u64) -> Result<bool, ServiceError> {
        let response = self
            .get(&format!("images/{}/processed/", image_id))
            .send()
            .await?;
        let response = check_status(response, "images/processed").await?;
        let processed: ProcessedResponse = response.json().await?;
        Ok(processed.processed)
    }

    async fn get_measurement(&self, image_id: u64) -> Result<GaugeMeasurement, ServiceError> {
        let response = self
            .get("measurements/")
            .query(&[("src_image", image_id)])
            .send()
            .await?;
        let response = check_status(response, "measurements").await.map_err(|e| {
            error!(
                "Error retrieving measurement: image_id={}, error={}",
                image_id, e
            );
            e
        })?;
        let measurements: Vec<GaugeMeasurement> = response.json().await?;
        let measurement = measurements
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("measurement for image {}", image_id)))?;
        debug!(
            "Measurement received left={}, right={}, top={}, bottom={}, float={}, value={:?}",
            measurement.body_left,
            measurement.body_right,
            measurement.body_top,
            measurement.body_bottom,
            measurement.float_top,
            measurement.value
        );
        Ok(measurement)
    }

    async fn test_connect(&self) -> ConnectStatus {
        match self.get("indicams/").send().await {
            Ok(resp) if resp.status().is_success() => ConnectStatus::Ok,
            Ok(resp)
                if resp.status() == StatusCode::UNAUTHORIZED
                    || resp.status() == StatusCode::FORBIDDEN =>
            {
                ConnectStatus::AuthFailed
            }
            Ok(resp) => {
                debug!("IndiCam connection test returned {}", resp.status());
                ConnectStatus::Failed
            }
            Err(e) => {
                debug!("IndiCam connection test failed: {}", e);
                ConnectStatus::Failed
            }
        }
    }
}
