//! Config command - write a starter configuration

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

/// Environment variables read on top of the file, in override order
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("MAPPING_URL", "catalog.mapping_url"),
    ("CMS_METADATA_NOTIFIER_ADDR", "notifier.address"),
    ("CMS_METADATA_NOTIFIER_HOST_HEADER", "notifier.host_header"),
];

pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(&path, force),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, AppConfig::example_toml())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    // Catch a template that no longer matches the config structs
    let written = AppConfig::load(Some(path))
        .with_context(|| format!("Written config does not load: {}", path.display()))?;

    println!("Created config file: {}", path.display());
    println!("  catalog:  {}", written.catalog.mapping_url);
    println!(
        "  notifier: {} (Host: {})",
        written.notifier.address, written.notifier.host_header
    );
    println!();
    println!("These environment variables override the file:");
    for (var, key) in ENV_OVERRIDES {
        println!("  {var:<36} {key}");
    }
    println!(
        "  {:<36} notifier Authorization header",
        written.notifier.auth_env
    );
    println!();
    println!("Run 'metadata-notifier doctor' to check the catalog and notifier.");

    Ok(())
}
