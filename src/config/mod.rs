// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod settings;

pub use settings::{
    DeviceSettings, HostSettings, IndicamConfig, ServiceSettings, DEFAULT_HOST_URL,
    DEFAULT_SCAN_INTERVAL_SECS, MIN_SCAN_INTERVAL_SECS,
};
