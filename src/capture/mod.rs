// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image capture for gauge cameras

pub mod grabber;
pub mod source;

pub use grabber::{
    AcquisitionError, CaptureSettings, ImageGrabber, FLASH_DELAY_SECONDS, GRAB_TIMEOUT,
    IMAGE_GET_RETRIES,
};
pub use source::{CameraSource, CaptureError, FlashSwitch};
