//! schlub - Path-addressed service registry
//!
//! Entry point for the schlub CLI.

mod cli;
mod cmd_services;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use schlub_config::ConfigLoader;

use crate::cli::{Cli, Commands};

/// Initialize tracing on stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging.level)?;
    debug!(roots = ?config.scan.roots, "Loaded configuration");

    match cli.command {
        Commands::List { pattern, name, kind, roots, format } => {
            cmd_services::list(&config, pattern, name, kind, &roots, &format).await
        }
        Commands::Get { pattern, roots, multiple, allow_none } => {
            cmd_services::get(&config, pattern, &roots, multiple, allow_none).await
        }
        Commands::Check => cmd_services::check(&config),
    }
}
