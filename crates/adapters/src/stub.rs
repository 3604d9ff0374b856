//! In-memory stand-ins for the catalog source and notifier

use async_trait::async_trait;
use metadata_notifier_domain::{
    CatalogError, CatalogRecord, CatalogSource, DeliveryError, DependencyProbe, Notifier,
};
use std::sync::{Mutex, PoisonError};

/// Catalog source serving a fixed set of records
pub struct StubCatalogSource {
    records: Mutex<Vec<CatalogRecord>>,
    unavailable: bool,
}

impl StubCatalogSource {
    pub fn with_records(records: Vec<CatalogRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            unavailable: false,
        }
    }

    /// A source that always fails as if the catalog were down
    pub fn unavailable() -> Self {
        Self {
            records: Mutex::new(vec![]),
            unavailable: true,
        }
    }

    /// Replace the records served by later fetches
    pub fn set_records(&self, records: Vec<CatalogRecord>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }
}

#[async_trait]
impl CatalogSource for StubCatalogSource {
    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        if self.unavailable {
            return Err(CatalogError::Status(503));
        }
        Ok(self.records.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

#[async_trait]
impl DependencyProbe for StubCatalogSource {
    async fn probe(&self) -> Result<(), String> {
        if self.unavailable {
            return Err("catalog unavailable".to_string());
        }
        Ok(())
    }
}

/// A payload captured by [`RecordingNotifier`]
#[derive(Debug, Clone)]
pub struct SentPayload {
    pub payload: Vec<u8>,
    pub transaction_id: String,
}

/// Notifier that records every payload instead of sending it
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentPayload>>,
    reject_with: Option<u16>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            reject_with: None,
        }
    }

    /// A notifier that records payloads but answers with the given status
    pub fn rejecting(status: u16) -> Self {
        Self {
            sent: Mutex::new(vec![]),
            reject_with: Some(status),
        }
    }

    pub fn sent(&self) -> Vec<SentPayload> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, payload: &[u8], transaction_id: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(SentPayload {
            payload: payload.to_vec(),
            transaction_id: transaction_id.to_string(),
        });
        match self.reject_with {
            Some(status) => Err(DeliveryError::UnexpectedStatus(status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DependencyProbe for RecordingNotifier {
    async fn probe(&self) -> Result<(), String> {
        match self.reject_with {
            Some(status) => Err(format!("Unhealthy status code received: [{status}]")),
            None => Ok(()),
        }
    }
}
