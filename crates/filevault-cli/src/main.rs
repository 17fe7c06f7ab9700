//! FileVault CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

mod commands;
mod output;

use commands::Cli;
use filevault_core::config::AppConfig;
use filevault_core::error::ErrorKind;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(exit_code(e.kind));
        }
    };

    init_logging(&config);
    tracing::debug!(command = ?cli.command, "Executing command");

    if let Err(e) = cli.execute(&config).await {
        output::print_error(&e.to_string());
        std::process::exit(exit_code(e.kind));
    }
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// command output.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        "compact" => {
            fmt()
                .compact()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Process exit status for each failure kind.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::InvalidArgument => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Denied => 4,
        ErrorKind::Conflict => 5,
        ErrorKind::StorageUnavailable => 6,
        ErrorKind::Configuration => 7,
        ErrorKind::Serialization => 8,
    }
}
