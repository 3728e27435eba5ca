//! Tubetally - format YouTube playlists and total up their running time.
//!
//! This is the command-line entry point.

mod cli;
mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tubetally_core::{CancellationToken, Result};

use crate::cli::{Cli, Command};
use crate::commands::AppContext;
use crate::logging::LoggingConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::auto()
        .with_verbosity(cli.verbose)
        .with_file_logging(!cli.no_log_file);
    if let Some(dir) = cli.log_dir.clone() {
        logging = logging.with_log_directory(dir);
    }
    let _guard = match logging::init(&logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: {e}; continuing without file logging");
            logging::init(&logging.with_file_logging(false)).ok()
        }
    };

    info!("Starting Tubetally {}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error::report(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let mut ctx = AppContext::load(cli.config_path)?;
    debug!("Using config at {}", ctx.config_path.display());

    match cli.command {
        Command::Format(args) => {
            let cancel = CancellationToken::new();
            let watcher = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
            let result = commands::run_format(&mut ctx, args, &cancel).await;
            watcher.abort();
            result
        }
        Command::History { action } => commands::run_history(&mut ctx, action),
        Command::Config { action } => commands::run_config(&mut ctx, action),
    }
}

/// Cancel the fetch at the next page boundary on Ctrl-C.
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, cancelling");
        cancel.cancel();
    }
}
