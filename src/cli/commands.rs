// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::IndicamConfig;
use crate::node::IndicamNode;
use crate::scheduler::run_cycle;
use crate::sensor::{LogSink, MeasurementSink};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "INDICAM_CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the once command
#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "INDICAM_CONFIG")]
    pub config: PathBuf,

    /// Device name as configured
    #[arg(long)]
    pub device: String,

    /// Publish the result to Home Assistant instead of only printing it
    #[arg(long)]
    pub publish: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "INDICAM_CONFIG")]
    pub config: PathBuf,
}

/// Measure all devices until Ctrl-C
pub async fn run(args: RunArgs) -> Result<()> {
    let config = IndicamConfig::load(&args.config)?;
    run_node(config).await
}

/// Shared by the CLI and the node binary
pub async fn run_node(config: IndicamConfig) -> Result<()> {
    let node = IndicamNode::from_config(config)?;
    node.check_connection().await?;

    let scheduler = node.start();
    println!(
        "📡 Measuring {} device(s), press Ctrl-C to stop",
        scheduler.device_count()
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, waiting for running cycles to finish");
    scheduler.shutdown().await;
    println!("👋 Stopped");
    Ok(())
}

/// Measure one device once
pub async fn once(args: OnceArgs) -> Result<()> {
    let config = IndicamConfig::load(&args.config)?;
    let node = IndicamNode::from_config(config)?;
    node.check_connection().await?;

    let mut sensor = node.sensor_by_name(&args.device)?;
    let sink: std::sync::Arc<dyn MeasurementSink> = if args.publish {
        node.sink()
    } else {
        std::sync::Arc::new(LogSink)
    };

    let measurement = run_cycle(&mut sensor, sink.as_ref()).await?;
    println!("✅ {}: {}", sensor.name(), sensor.state().state);
    println!("{}", serde_json::to_string_pretty(&measurement)?);
    Ok(())
}

/// Test the service connection and report the configured devices
pub async fn check(args: CheckArgs) -> Result<()> {
    let config = IndicamConfig::load(&args.config)?;
    let node = IndicamNode::from_config(config)?;
    node.check_connection().await?;

    println!("✅ Connected to {}", node.config().service.url);
    for device in &node.config().devices {
        println!(
            "  - {} (service device {}, every {}h)",
            device.name,
            device.service_device,
            device.scan_interval_secs / 3600
        );
    }
    Ok(())
}
