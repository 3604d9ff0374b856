//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::CatalogRecord;

/// Error type for catalog source operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Couldn't fetch mappings: [{0}]")]
    Fetch(String),
    #[error("Unhealthy status code received: [{0}]")]
    Status(u16),
    #[error("Couldn't decode mappings: [{0}]")]
    Decode(String),
}

/// Port for fetching the raw term catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every catalog record, in source order
    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError>;
}

/// Error type for delivery to the downstream notifier
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Creating request: [{0}]")]
    Request(String),
    #[error("Sending metadata to notifier: [{0}]")]
    Transport(String),
    #[error("Sending metadata to notifier: unexpected status code: [{0}]")]
    UnexpectedStatus(u16),
}

/// Port for delivering a serialized publication envelope
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the envelope bytes once; no retries
    async fn send(&self, payload: &[u8], transaction_id: &str) -> Result<(), DeliveryError>;
}

/// Port for checking that a dependency is reachable and healthy
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    async fn probe(&self) -> Result<(), String>;
}
