//! metadata-notifier CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};

/// Targets logged at the requested level; anything else only at `warn`
const LOG_TARGETS: &[&str] = &[
    "metadata_notifier",
    "metadata_notifier_domain",
    "metadata_notifier_adapters",
    "tower_http",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.as_deref().unwrap_or("info");
    init_logging(log_level, cli.log_json)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, cli.config).await,
        Commands::Mappings(args) => commands::mappings::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args),
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

/// `RUST_LOG` wins when set, otherwise the relay's own targets at `level`
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(level))
            .with_context(|| format!("Invalid log level: {level}"))?,
    };

    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    Ok(())
}

fn default_directives(level: &str) -> String {
    std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}
