// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use indicam_node::{cli::commands::run_node, config::IndicamConfig, version};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);

    dotenv::dotenv().ok();
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("INDICAM_CONFIG").ok())
        .ok_or_else(|| anyhow!("Usage: indicam-node <config.toml> (or set INDICAM_CONFIG)"))?;

    let config = IndicamConfig::load(&config_path)?;
    run_node(config).await
}
