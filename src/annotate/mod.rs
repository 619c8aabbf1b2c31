// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic images for gauge measurements
//!
//! Each cycle writes the raw snapshot and, when a measurement is available,
//! an annotated copy showing what the service detected.

pub mod decorator;
pub mod overlay;
pub mod store;

use thiserror::Error;

pub use decorator::ResultAnnotator;
pub use overlay::{GaugeOverlay, HLine, BODY_COLOR, MEASURE_COLOR};
pub use store::ImageFileStore;

/// Errors from rendering or storing diagnostic images
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}
