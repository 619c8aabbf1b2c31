// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Where sensor states and measurement events are delivered

use async_trait::async_trait;
use thiserror::Error;

use super::payload::{MeasurementEvent, SensorState};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Publish request failed: {0}")]
    Request(String),

    #[error("Publish rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        PublishError::Request(err.to_string())
    }
}

/// Receives the results of each measurement cycle
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    async fn publish_state(&self, entity_id: &str, state: &SensorState) -> Result<(), PublishError>;

    async fn fire_event(&self, event: &MeasurementEvent) -> Result<(), PublishError>;
}

/// Sink that only logs; used when no host is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MeasurementSink for LogSink {
    async fn publish_state(&self, entity_id: &str, state: &SensorState) -> Result<(), PublishError> {
        tracing::info!("{} = {}", entity_id, state.state);
        Ok(())
    }

    async fn fire_event(&self, event: &MeasurementEvent) -> Result<(), PublishError> {
        tracing::debug!(
            "Indicam measurement for {}: {:?}",
            event.entity_id,
            event.value
        );
        Ok(())
    }
}
