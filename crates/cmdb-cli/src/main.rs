//! cmdb - command-line moderation console for the cmdb backend.
//!
//! Each subcommand mirrors one page of the web dashboard and calls the same
//! API, with the same session refresh and login redirect behavior.

mod commands;
mod navigator;
mod output;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmdb_core::{ApiClient, AppContext, Config};

use commands::Cli;
use navigator::TerminalNavigator;
use output::Output;

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). When a log file is
/// configured, events are also written there; the returned guard flushes it
/// and must be held until exit.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    let _guard = init_tracing(&config);
    info!(server = %config.server_url, "cmdb starting");

    let location = cli.command.location();
    debug!(%location, "Dashboard location");

    let navigator = Arc::new(TerminalNavigator::new(location));
    let client = ApiClient::new(&config, navigator)?;
    let ctx = AppContext::new();
    let out = Output { json: cli.json };

    let result = commands::run(cli.command, &client, &ctx, &out).await;

    if let Some(message) = ctx.current_toast() {
        eprintln!("{}", message);
    }
    result
}
