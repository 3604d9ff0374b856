//! CMS metadata notifier client

use async_trait::async_trait;
use metadata_notifier_domain::{DeliveryError, DependencyProbe, Notifier};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::drain;

/// Value of the `X-Origin-System-Id` header on every delivery
pub const ORIGIN_SYSTEM_ID: &str = "brightcove";

/// Connection settings for the downstream notifier
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    /// Network address, e.g. `http://gateway:8080`
    pub address: String,
    /// `Host` header to send instead of the address host; empty disables the override
    pub host_header: String,
    /// Value for the `Authorization` header, if any
    pub auth: Option<SecretString>,
    pub timeout: Duration,
}

/// Posts publication envelopes to `{address}/notify`
pub struct HttpNotifier {
    client: Client,
    settings: NotifierSettings,
}

impl HttpNotifier {
    pub fn new(settings: NotifierSettings) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn with_host(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.settings.host_header.is_empty() {
            builder
        } else {
            builder.header(HOST, &self.settings.host_header)
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, payload: &[u8], transaction_id: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/notify", self.settings.address);

        let mut builder = self
            .client
            .post(&url)
            .header("X-Origin-System-Id", ORIGIN_SYSTEM_ID)
            .header("X-Request-Id", transaction_id)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec());
        builder = self.with_host(builder);
        if let Some(auth) = &self.settings.auth {
            builder = builder.header(AUTHORIZATION, auth.expose_secret());
        }

        let request = builder
            .build()
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        drain(response).await;

        if status != StatusCode::OK {
            return Err(DeliveryError::UnexpectedStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl DependencyProbe for HttpNotifier {
    async fn probe(&self) -> Result<(), String> {
        let url = format!("{}/__health", self.settings.address);

        let response = self
            .with_host(self.client.get(&url))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        drain(response).await;

        if status != StatusCode::OK {
            return Err(format!("Unhealthy status code received: [{}]", status.as_u16()));
        }
        Ok(())
    }
}
