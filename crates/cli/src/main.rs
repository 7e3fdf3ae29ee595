//! Lavacar CLI - UAU Clube Lavacar admin API client

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use lavacar_core::telemetry::{LogFormat, init_tracing};
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "lavacar")]
#[command(about = "Command line client for the UAU Clube Lavacar admin API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (defaults to config.toml in LAVACAR_STATE_DIR)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Where the session tokens are kept between runs
    #[arg(long, global = true, env = "LAVACAR_CREDENTIALS")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(cli.log_level.as_str(), format)?;

    debug!("Starting Lavacar CLI");

    if let Err(e) = cli.command.execute(cli.config, cli.credentials).await {
        error!("Command failed: {e:#}");
        eprintln!("erro: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
