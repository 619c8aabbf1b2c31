// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Host-facing payloads produced from a gauge measurement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::GaugeMeasurement;

/// Event name fired after every successful measurement
pub const INDICAM_MEASUREMENT_EVENT: &str = "image_processing.indicam_measurement";

/// Attribute key under which the last measurement is published
pub const ATTR_GAUGE_MEASUREMENT: &str = "gauge_measurement";

/// Convert a display name into an entity id fragment ("Oil Tank" -> "oil_tank")
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Attributes published alongside the sensor value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAttributes {
    pub friendly_name: String,
    pub unit_of_measurement: String,
    pub device_class: String,
    pub state_class: String,
    pub gauge_measurement: Option<GaugeMeasurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_measured: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_secs: Option<f64>,
}

/// Sensor state in the shape the host's state API accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Fill level in percent, or "unknown" before the first reading
    pub state: String,
    pub attributes: SensorAttributes,
}

/// Payload of the measurement event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEvent {
    pub body_left: i64,
    pub body_right: i64,
    pub body_top: i64,
    pub body_bottom: i64,
    pub float_top: i64,
    pub value: Option<f64>,
    pub entity_id: String,
}

impl MeasurementEvent {
    pub fn new(measurement: &GaugeMeasurement, entity_id: impl Into<String>) -> Self {
        Self {
            body_left: measurement.body_left,
            body_right: measurement.body_right,
            body_top: measurement.body_top,
            body_bottom: measurement.body_bottom,
            float_top: measurement.float_top,
            value: measurement.value,
            entity_id: entity_id.into(),
        }
    }
}
