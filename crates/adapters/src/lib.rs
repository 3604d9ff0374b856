//! metadata-notifier adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `catalog`: HTTP term catalog source
//! - `notifier`: CMS metadata notifier client
//! - `health`: Dependency health checks
//! - `api`: Inbound HTTP API (axum)
//! - `stub`: In-memory stand-ins for tests and local runs

mod catalog_http;
mod notifier_http;

pub mod api;
pub mod health;
pub mod stub;

/// Re-exports for catalog adapters
pub mod catalog {
    pub use crate::catalog_http::HttpCatalogSource;
    pub use crate::stub::StubCatalogSource;
}

/// Re-exports for notifier adapters
pub mod notifier {
    pub use crate::notifier_http::{HttpNotifier, NotifierSettings, ORIGIN_SYSTEM_ID};
    pub use crate::stub::{RecordingNotifier, SentPayload};
}

/// Read a response body to the end so the connection can be reused
pub(crate) async fn drain(response: reqwest::Response) {
    if let Err(e) = response.bytes().await {
        tracing::warn!(error = %e, "Failed to drain response body");
    }
}
