// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Renders measurement overlays and saves snapshot/measure images

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::overlay::GaugeOverlay;
use super::store::ImageFileStore;
use super::AnnotationError;
use crate::service::{CamConfig, GaugeMeasurement};

/// Maximum accepted image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Saves the per-cycle diagnostic images of one device
#[derive(Debug, Clone)]
pub struct ResultAnnotator {
    store: Option<ImageFileStore>,
    name_prefix: String,
}

impl ResultAnnotator {
    /// Without an output directory every call is a no-op
    pub fn new(output_dir: Option<PathBuf>, name_prefix: impl Into<String>) -> Self {
        Self {
            store: output_dir.map(ImageFileStore::new),
            name_prefix: name_prefix.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .map(|store| store.snapshot_path(&self.name_prefix))
    }

    pub fn measure_path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .map(|store| store.measure_path(&self.name_prefix))
    }

    /// Save the snapshot and refresh (or clear) the annotated image
    ///
    /// The snapshot is written best effort. With no measurement, or an image
    /// that cannot be decoded, the previous measure image is removed so it
    /// never shows a stale result.
    pub async fn decorate_and_save(
        &self,
        image: &[u8],
        measurement: Option<&GaugeMeasurement>,
        cam_config: &CamConfig,
    ) -> Result<(), AnnotationError> {
        let store = match &self.store {
            Some(store) => store,
            None => return Ok(()),
        };

        let snapshot_path = store.snapshot_path(&self.name_prefix);
        if let Err(e) = store.save(&snapshot_path, image).await {
            warn!(
                "Failed to save snapshot to {}: {}",
                snapshot_path.display(),
                e
            );
        }

        let measure_path = store.measure_path(&self.name_prefix);
        let msr = match measurement {
            Some(msr) => msr,
            None => {
                debug!("No measurement for {}, clearing measure image", self.name_prefix);
                return store.remove(&measure_path).await;
            }
        };

        match render_measurement(image, msr, cam_config) {
            Ok(rendered) => store.save(&measure_path, &rendered).await,
            Err(e) => {
                store.remove(&measure_path).await?;
                Err(e)
            }
        }
    }
}

/// Draw the overlay on a copy of `image` and return it JPEG-encoded
pub fn render_measurement(
    image: &[u8],
    msr: &GaugeMeasurement,
    cam_config: &CamConfig,
) -> Result<Vec<u8>, AnnotationError> {
    let mut canvas = decode_image(image)?.to_rgb8();
    let (width, height) = canvas.dimensions();
    GaugeOverlay::compute(msr, cam_config, width, height).draw(&mut canvas);

    let mut out = Vec::new();
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .map_err(|e| AnnotationError::Encode(e.to_string()))?;
    Ok(out)
}

fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AnnotationError> {
    if bytes.is_empty() {
        return Err(AnnotationError::Decode("empty image data".to_string()));
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(AnnotationError::Decode(format!(
            "image too large: {} bytes (max {})",
            bytes.len(),
            MAX_IMAGE_SIZE
        )));
    }
    image::load_from_memory(bytes).map_err(|e| AnnotationError::Decode(e.to_string()))
}
