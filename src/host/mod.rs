// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod hass;

pub use hass::{HomeAssistantClient, HOST_TIMEOUT};
