//! Notification use case: decode, validate, resolve, serialize, deliver

use serde::de;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    document::{DocumentError, build_document},
    model::{NotifyOutcome, PublicationEnvelope, VideoEvent},
    ports::{DeliveryError, Notifier},
    store::MappingStore,
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Cannot decode video metadata: [{0}]")]
    Decode(#[from] serde_json::Error),
    #[error("Missing uuid")]
    MissingUuid,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl NotifyError {
    /// Whether the failure is attributed to the caller.
    ///
    /// Undecodable bodies are reported as server errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingUuid)
    }
}

/// Turns video events into publication envelopes and hands them to the notifier
pub struct NotifyUseCase<N: ?Sized> {
    store: Arc<MappingStore>,
    notifier: Arc<N>,
}

impl<N: Notifier + ?Sized> NotifyUseCase<N> {
    pub fn new(store: Arc<MappingStore>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Handle a raw inbound request body
    pub async fn handle(
        &self,
        body: &[u8],
        transaction_id: &str,
    ) -> Result<NotifyOutcome, NotifyError> {
        let event = decode_event(body)?;
        self.notify(&event, transaction_id).await
    }

    /// Handle an already decoded event
    pub async fn notify(
        &self,
        event: &VideoEvent,
        transaction_id: &str,
    ) -> Result<NotifyOutcome, NotifyError> {
        if event.uuid.is_empty() {
            return Err(NotifyError::MissingUuid);
        }

        if event.tags.is_empty() {
            tracing::info!(
                transaction_id = %transaction_id,
                uuid = %event.uuid,
                "Video has no tags, no metadata will be generated"
            );
            return Ok(NotifyOutcome::NoTags {
                uuid: event.uuid.clone(),
            });
        }

        let (envelope, tag_count) = self.build_envelope(event, transaction_id)?;
        let payload = envelope.to_json()?;

        self.notifier.send(&payload, transaction_id).await?;

        tracing::info!(
            transaction_id = %transaction_id,
            uuid = %event.uuid,
            tag_count,
            "Sent metadata event"
        );

        Ok(NotifyOutcome::Delivered {
            uuid: event.uuid.clone(),
            tag_count,
        })
    }

    /// Build the envelope for an event against the current mapping table
    pub fn build_envelope(
        &self,
        event: &VideoEvent,
        transaction_id: &str,
    ) -> Result<(PublicationEnvelope, usize), NotifyError> {
        let table = self.store.snapshot();
        let document = build_document(&event.tags, &table, transaction_id);
        let envelope = PublicationEnvelope::from_document(event.uuid.clone(), &document)?;
        Ok((envelope, document.tags.len()))
    }
}

/// Decode the first JSON value of the body; anything after it is ignored
fn decode_event(body: &[u8]) -> Result<VideoEvent, serde_json::Error> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<VideoEvent>()
        .next()
        .unwrap_or_else(|| {
            Err(<serde_json::Error as de::Error>::custom(
                "empty request body",
            ))
        })
}
