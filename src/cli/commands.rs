//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::RosterConfig;
use crate::http::HttpServer;
use crate::service::RosterService;
use crate::store::InMemoryStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Environment variable overriding the configured log filter
pub const LOG_ENV: &str = "ROSTER_LOG";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config, force } => init(&config, force),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Write a default configuration file
pub fn init(config_path: &Path, force: bool) -> CliResult<()> {
    if config_path.exists() && !force {
        return Err(CliError::already_initialized(config_path.display()));
    }

    RosterConfig::default().save(config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

/// Start the HTTP server over a fresh in-memory store
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = resolve_config(config_path, port)?;

    init_tracing(&config.log_filter)?;

    let service = RosterService::new(Arc::new(InMemoryStore::new()));
    let server = HttpServer::new(config, service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Load the config file and apply command-line overrides
fn resolve_config(config_path: &Path, port: Option<u16>) -> CliResult<RosterConfig> {
    let mut config = RosterConfig::load(config_path)?;
    if let Some(port) = port {
        config.port = port;
        config.validate()?;
    }
    Ok(config)
}

fn init_tracing(default_filter: &str) -> CliResult<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| CliError::config_error(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| CliError::boot_failed(format!("Failed to initialize logging: {}", e)))
}
