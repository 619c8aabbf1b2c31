// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Periodic measurement cycles, one task per device

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::sensor::{CycleError, GaugeSensor, MeasurementSink};
use crate::service::GaugeMeasurement;

/// Run one cycle and publish its result
///
/// The sensor state is published after every cycle so the host sees fresh
/// attributes; the measurement event only follows a successful cycle.
pub async fn run_cycle(
    sensor: &mut GaugeSensor,
    sink: &dyn MeasurementSink,
) -> Result<GaugeMeasurement, CycleError> {
    let result = sensor.update().await;

    if let Err(e) = sink.publish_state(sensor.entity_id(), &sensor.state()).await {
        warn!(device = %sensor.name(), "Failed to publish sensor state: {}", e);
    }
    if result.is_ok() {
        if let Some(event) = sensor.measurement_event() {
            if let Err(e) = sink.fire_event(&event).await {
                warn!(device = %sensor.name(), "Failed to fire measurement event: {}", e);
            }
        }
    }
    result
}

/// Drives the gauge sensors until shut down
pub struct Scheduler {
    sink: Arc<dyn MeasurementSink>,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(sink: Arc<dyn MeasurementSink>) -> Self {
        Self {
            sink,
            shutdown: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn device_count(&self) -> usize {
        self.handles.len()
    }

    /// Start measuring `sensor` now and then every `period`
    pub fn spawn(&mut self, sensor: GaugeSensor, period: Duration) {
        info!(
            device = %sensor.name(),
            "Scheduling measurements every {}s",
            period.as_secs()
        );
        let sink = self.sink.clone();
        let shutdown = self.shutdown.clone();
        self.handles
            .push(tokio::spawn(device_loop(sensor, period, sink, shutdown)));
    }

    /// Stop after the running cycles finish
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.join().await;
    }

    /// Wait for every device task to end
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Device task ended abnormally: {}", e);
            }
        }
    }
}

async fn device_loop(
    mut sensor: GaugeSensor,
    period: Duration,
    sink: Arc<dyn MeasurementSink>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        // A cycle in progress is never interrupted
        match run_cycle(&mut sensor, sink.as_ref()).await {
            Ok(msr) => debug!(device = %sensor.name(), "Cycle complete: value={:?}", msr.value),
            Err(e) => warn!(device = %sensor.name(), "Cycle failed: {}", e),
        }
    }
    info!(device = %sensor.name(), "Measurement task stopped");
}
