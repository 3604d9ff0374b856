//! Doctor command - validate configuration and check dependencies

use anyhow::{Context, Result};
use metadata_notifier_adapters::{catalog::HttpCatalogSource, notifier::HttpNotifier};
use metadata_notifier_domain::{CatalogSource, DependencyProbe, catalog::build_table};
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    catalog: CheckResult,
    notifier: CheckResult,
    auth: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self::with_status("ok", message)
    }

    fn warn(message: impl Into<String>) -> Self {
        Self::with_status("warn", message)
    }

    fn error(message: impl Into<String>) -> Self {
        Self::with_status("error", message)
    }

    fn with_status(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        catalog: CheckResult::error("Not checked"),
        notifier: CheckResult::error("Not checked"),
        auth: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match load_config(config_path, &args) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("{:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.catalog = check_catalog(config).await;
        report.notifier = check_notifier(config).await;
        report.auth = check_auth(config);
    }

    let checks = [
        &report.config,
        &report.catalog,
        &report.notifier,
        &report.auth,
    ];

    report.overall = if checks.iter().any(|c| c.is_error()) {
        "error".to_string()
    } else if checks.iter().all(|c| c.is_ok()) {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

/// Load the config the same way `serve` does, flags and env vars included
fn load_config(config_path: Option<PathBuf>, args: &DoctorArgs) -> Result<AppConfig> {
    let mut config =
        AppConfig::load(config_path.as_deref()).context("Failed to load config")?;
    config.apply_serve_args(&args.overrides);
    config.validate()?;
    Ok(config)
}

async fn check_catalog(config: &AppConfig) -> CheckResult {
    let source = match HttpCatalogSource::new(&config.catalog.mapping_url, config.catalog_timeout())
    {
        Ok(s) => s,
        Err(e) => return CheckResult::error(format!("Failed to initialize catalog client: {}", e)),
    };

    match source.fetch_records().await {
        Ok(records) => {
            let parsed = build_table(&records);
            let message = format!(
                "{} mappings loaded from {}",
                parsed.table.len(),
                source.url()
            );
            let result = if parsed.rejected > 0 {
                CheckResult::warn(format!("{message}, {} records rejected", parsed.rejected))
            } else {
                CheckResult::ok(message)
            };
            result.with_details(serde_json::json!({
                "records": records.len(),
                "entries": parsed.table.len(),
                "rejected": parsed.rejected,
            }))
        }
        Err(e) => CheckResult::error(e.to_string()),
    }
}

async fn check_notifier(config: &AppConfig) -> CheckResult {
    if config.notifier.address.trim().is_empty() {
        return CheckResult::error("No notifier address configured");
    }

    let notifier = match HttpNotifier::new(config.notifier_settings()) {
        Ok(n) => n,
        Err(e) => return CheckResult::error(format!("Failed to initialize notifier client: {}", e)),
    };

    match notifier.probe().await {
        Ok(()) => CheckResult::ok(format!(
            "Notifier healthy at {} (Host: {})",
            config.notifier.address, config.notifier.host_header
        )),
        Err(e) => CheckResult::warn(format!(
            "Notifier at {} is not healthy: {}",
            config.notifier.address, e
        )),
    }
}

fn check_auth(config: &AppConfig) -> CheckResult {
    let env_var = &config.notifier.auth_env;

    if env_var.is_empty() {
        return CheckResult::ok("No authorization env var configured");
    }

    match config.notifier_auth() {
        Some(_) => CheckResult::ok(format!("Authorization: {} (set, not empty)", env_var)),
        None => CheckResult::warn(format!("Authorization: {} (empty)", env_var)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("metadata-notifier Doctor Report");
    println!("===============================");
    println!();

    print_check("Config", &report.config);
    print_check("Catalog", &report.catalog);
    print_check("Notifier", &report.notifier);
    print_check("Auth", &report.auth);

    println!();
    println!(
        "{} Overall: {}",
        symbol(&report.overall),
        report.overall.to_uppercase()
    );

    if report.overall == "ok" {
        println!();
        println!("Ready to serve! Try: metadata-notifier serve");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("{} {}: {}", symbol(&result.status), name, result.message);
}

fn symbol(status: &str) -> &'static str {
    match status {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    }
}
