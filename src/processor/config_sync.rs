// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Camera configuration synchronization with the service
//!
//! The local configuration is authoritative: when the service holds a
//! different calibration for the device, the local one is pushed as a new
//! camera config. Reconciliation runs lazily, on the first cycle that needs
//! it, and is latched afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::MeasurementError;
use crate::service::{CamConfig, IndicamService};

/// When a reconciled configuration has to be checked against the service again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncPolicy {
    /// Reconcile once per process lifetime (or until invalidated)
    #[default]
    Once,
    /// Reconcile again whenever the local configuration changes
    OnChange,
}

/// Association between a device handle and its numeric service id
///
/// The id is looked up on first use and cached for the life of the binding.
#[derive(Debug, Clone)]
pub struct DeviceBinding {
    device_name: String,
    indicam_id: Option<u64>,
}

impl DeviceBinding {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            indicam_id: None,
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// The cached service id, if it has been resolved
    pub fn indicam_id(&self) -> Option<u64> {
        self.indicam_id
    }

    /// Return the service id, looking it up on first use
    pub async fn resolve(
        &mut self,
        service: &dyn IndicamService,
    ) -> Result<u64, MeasurementError> {
        if let Some(id) = self.indicam_id {
            return Ok(id);
        }
        let id = service
            .resolve_device_id(&self.device_name)
            .await
            .map_err(|e| MeasurementError::unavailable("device lookup", &e))?;
        debug!("Resolved device {} to indicam id {}", self.device_name, id);
        self.indicam_id = Some(id);
        Ok(id)
    }
}

/// Keeps the service's camera configuration in line with the local one
#[derive(Debug, Clone, Default)]
pub struct CameraConfigSynchronizer {
    policy: ResyncPolicy,
    synced: Option<CamConfig>,
}

impl CameraConfigSynchronizer {
    pub fn new(policy: ResyncPolicy) -> Self {
        Self {
            policy,
            synced: None,
        }
    }

    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    /// Whether `local` needs no reconciliation under the current policy
    pub fn is_synced(&self, local: &CamConfig) -> bool {
        match (self.policy, &self.synced) {
            (_, None) => false,
            (ResyncPolicy::Once, Some(_)) => true,
            (ResyncPolicy::OnChange, Some(reconciled)) => reconciled == local,
        }
    }

    /// Forget the reconciliation so the next call checks the service again
    pub fn invalidate(&mut self) {
        self.synced = None;
    }

    /// Make sure the service holds `local` for the bound device
    ///
    /// On failure the sync state is left untouched, so the next cycle tries
    /// again.
    pub async fn ensure_synced(
        &mut self,
        service: &dyn IndicamService,
        binding: &mut DeviceBinding,
        local: &CamConfig,
    ) -> Result<(), MeasurementError> {
        if self.is_synced(local) {
            return Ok(());
        }
        let indicam_id = binding.resolve(service).await?;
        debug!("Fetching service camconfig for indicam ID={}", indicam_id);

        let remote = service
            .get_camera_config(indicam_id)
            .await
            .map_err(|e| MeasurementError::unavailable("camera configuration fetch", &e))?;

        if remote == *local {
            debug!("Local cam config the same as at service");
            self.synced = Some(*local);
            return Ok(());
        }

        service
            .set_camera_config(indicam_id, local)
            .await
            .map_err(|e| MeasurementError::unavailable("camera configuration create", &e))?;
        info!(
            "Pushed camera config to service: device={}, min_perc={}, max_perc={}",
            binding.device_name(),
            local.min_perc,
            local.max_perc
        );
        self.synced = Some(*local);
        Ok(())
    }
}
