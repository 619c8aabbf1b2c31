// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// IndiCam gauge reader CLI
#[derive(Parser, Debug)]
#[command(name = "indicam-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Read analog gauges through the IndiCam service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure every configured device on its schedule until interrupted
    Run(commands::RunArgs),

    /// Run a single measurement cycle for one device
    Once(commands::OnceArgs),

    /// Test the connection to the IndiCam service
    Check(commands::CheckArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => commands::run(args).await,
        Commands::Once(args) => commands::once(args).await,
        Commands::Check(args) => commands::check(args).await,
    }
}
