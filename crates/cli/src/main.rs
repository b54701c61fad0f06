//! roombook - admin console for the meeting-room booking platform

mod commands;
mod config;
mod console;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use roombook_http::ClientError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "roombook")]
#[command(about = "Manage users, meeting rooms and bookings")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for credentials and logs
    #[arg(short = 'd', long, global = true, env = "ROOMBOOK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to roombook.toml or config/roombook.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref(), cli.data_dir)?;
    logging::init_logging(cli.log_level.into(), &settings.data_dir(), cli.no_file_log)?;

    info!(base_url = %settings.base_url(), "Starting roombook");
    let client = config::build_client(&settings)?;

    let outcome = if cli.timeout == 0 {
        cli.command.execute(&client, &settings).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&client, &settings)).await
        {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            // Let a scheduled login redirect run so stale credentials are dropped
            while client.navigation().has_pending() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            match e.downcast_ref::<ClientError>() {
                // Already shown to the user by the notifier
                Some(client_error) if client_error.is_notified() => {}
                _ => error!("Command failed: {e}"),
            }
            std::process::exit(1);
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
