//! Serve command - load the mappings and run the notification API

use anyhow::{Context, Result};
use metadata_notifier_adapters::{
    api::{AppState, build_router},
    catalog::HttpCatalogSource,
    health::{CheckInfo, HealthChecker},
    notifier::HttpNotifier,
};
use metadata_notifier_domain::{
    CatalogSource, MappingStore, Notifier,
    usecases::{CatalogReloader, NotifyUseCase},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::args::ServeArgs;
use crate::config::AppConfig;

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load(config_path.as_deref())?;
    config.apply_serve_args(&args);
    config.validate()?;
    config.log_effective();

    let catalog = Arc::new(
        HttpCatalogSource::new(&config.catalog.mapping_url, config.catalog_timeout())
            .context("Failed to initialize catalog client")?,
    );
    let notifier = Arc::new(
        HttpNotifier::new(config.notifier_settings())
            .context("Failed to initialize notifier client")?,
    );
    let store = Arc::new(MappingStore::new());

    let reloader = Arc::new(CatalogReloader::<dyn CatalogSource>::new(
        catalog.clone(),
        store.clone(),
    ));
    reloader
        .reload()
        .await
        .context("Failed to load the initial mappings")?;

    let notify = Arc::new(NotifyUseCase::<dyn Notifier>::new(
        store.clone(),
        notifier.clone(),
    ));
    let health = Arc::new(
        HealthChecker::new()
            .with_check(CheckInfo::notifier_reachable(), notifier)
            .with_check(CheckInfo::catalog_available(), catalog),
    );

    let router = build_router(AppState {
        notify,
        reloader,
        health,
    });

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, mappings = store.len(), "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Received shutdown signal, stopping");
}
