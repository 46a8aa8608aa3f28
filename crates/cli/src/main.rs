//! PaperPause CLI entry point.
//!
//! This binary is the composition root for the review pipeline:
//!
//! 1. **Parse arguments and configuration.** Arguments come from `clap`.
//!    Configuration layers defaults, `.paperpause/config.toml` and
//!    `PAPERPAUSE__*` variables (see [`crate::config`]).
//! 2. **Wire observability.** A `tracing-subscriber` registry with an
//!    env filter, a pretty or JSON console layer, and an optional OTLP
//!    exporter (see [`crate::telemetry`]).
//! 3. **Construct infrastructure.** The Gemini client behind a retrying
//!    `ModelGateway`, the HTTP image source, the file-system content store,
//!    and the shared concurrency limiter, injected into the reviewer.
//! 4. **Run the command.** `review-one` or `review-batch`.
//!
//! Exit status is 0 on success and 1 when the review (or any batch item)
//! failed. Usage errors exit with 2.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;
mod config;
mod telemetry;

use crate::commands::{ReviewBatchArgs, ReviewOneArgs, Services};
use crate::config::AppConfig;
use crate::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "paperpause", version, about = "SEO review for coloring pages")]
struct Cli {
    /// Configuration file (default: .paperpause/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Console log format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Review one page and print the proposed SEO fields.
    ReviewOne(ReviewOneArgs),
    /// Review every page of a collection, or those named in a manifest.
    ReviewBatch(ReviewBatchArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let telemetry = match telemetry::init(cli.log_format, config.otlp_endpoint().as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialise telemetry: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = ?err, "command failed");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(command: Command, config: &AppConfig) -> anyhow::Result<ExitCode> {
    let services = Services::build(config).await?;
    match command {
        Command::ReviewOne(args) => commands::review_one(&services, &args).await,
        Command::ReviewBatch(args) => commands::review_collection(&services, &args).await,
    }
}
