//! Qroom CLI - study groups, PDF quizzes and Q&A from the terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use qroom_http::ClientError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

/// Exit status when the stored session can no longer be used
const EXIT_LOGIN_REQUIRED: i32 = 2;

#[derive(Parser)]
#[command(name = "qroom")]
#[command(about = "Command line client for Qroom study groups")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the session, answer drafts, config and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data_dir>/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
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

    let data_dir = config::resolve_data_dir(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    info!(data_dir = %data_dir.display(), "Starting Qroom CLI");

    let run = cli.command.execute(data_dir, cli.config);
    let result = if cli.timeout == 0 {
        run.await
    } else {
        match tokio::time::timeout(Duration::from_secs(cli.timeout), run).await {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                eprintln!("error: command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(report(&e));
        }
    }
}

/// Print a failure for the user and pick the exit status
fn report(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ClientError>() {
        Some(client_error) if client_error.is_auth_expired() => {
            eprintln!(
                "error: {}\nrun `qroom login` to sign in again",
                client_error.user_message()
            );
            EXIT_LOGIN_REQUIRED
        }
        Some(client_error) => {
            eprintln!("error: {}", client_error.user_message());
            1
        }
        None => {
            eprintln!("error: {error:#}");
            1
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
