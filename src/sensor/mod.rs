// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gauge sensors and what they publish

pub mod entity;
pub mod payload;
pub mod sink;

pub use entity::{CycleError, GaugeSensor};
pub use payload::{
    slugify, MeasurementEvent, SensorAttributes, SensorState, ATTR_GAUGE_MEASUREMENT,
    INDICAM_MEASUREMENT_EVENT,
};
pub use sink::{LogSink, MeasurementSink, PublishError};
