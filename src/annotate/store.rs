// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! File storage for snapshot and annotated images

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::AnnotationError;

/// Writes the per-device diagnostic images below one output directory
#[derive(Debug, Clone)]
pub struct ImageFileStore {
    base_path: PathBuf,
}

impl ImageFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `<dir>/<prefix>-snapshot.jpg`
    pub fn snapshot_path(&self, prefix: &str) -> PathBuf {
        self.base_path.join(format!("{}-snapshot.jpg", prefix))
    }

    /// `<dir>/<prefix>-measure.jpg`
    pub fn measure_path(&self, prefix: &str) -> PathBuf {
        self.base_path.join(format!("{}-measure.jpg", prefix))
    }

    /// Replace `path` with `bytes` so readers never see a partial file
    pub async fn save(&self, path: &Path, bytes: &[u8]) -> Result<(), AnnotationError> {
        fs::create_dir_all(&self.base_path).await?;

        let temp_path = path.with_extension("tmp");
        if let Err(e) = write_synced(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        fs::rename(&temp_path, path).await?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Remove `path`; a file that is already gone is not an error
    pub async fn remove(&self, path: &Path) -> Result<(), AnnotationError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
