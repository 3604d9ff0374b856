//! HTTP term catalog source

use async_trait::async_trait;
use metadata_notifier_domain::{CatalogError, CatalogRecord, CatalogSource, DependencyProbe};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::drain;

/// Fetches the mapping spreadsheet as a JSON array of string-keyed records
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            drain(response).await;
            return Err(CatalogError::Status(status));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DependencyProbe for HttpCatalogSource {
    async fn probe(&self) -> Result<(), String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        drain(response).await;

        if status != StatusCode::OK {
            return Err(format!("Invalid status code received: [{}]", status.as_u16()));
        }
        Ok(())
    }
}
