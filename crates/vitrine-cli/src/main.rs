#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use anyhow::Context;

use crate::config::{Cli, create_asset_store};

// Tracing target constants
pub const TRACING_TARGET_CLI: &str = "vitrine_cli";
pub const TRACING_TARGET_CONFIG: &str = "vitrine_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "vitrine_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_CLI,
            error = %error,
            "command failed"
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let store = create_asset_store(&cli).context("failed to create asset store")?;
    let output = cli.command.execute(&store).await?;

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
