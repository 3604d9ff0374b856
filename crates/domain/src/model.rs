//! Domain models and value objects

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A concept in a controlled vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Display name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    /// Vocabulary the term belongs to (e.g. "Sections")
    pub taxonomy: String,
    /// Term identifier, including the encoded taxonomy suffix
    pub id: String,
}

impl Term {
    pub fn new(id: impl Into<String>, taxonomy: impl Into<String>) -> Self {
        Self {
            canonical_name: None,
            taxonomy: taxonomy.into(),
            id: id.into(),
        }
    }

    pub fn with_canonical_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_name = Some(name.into());
        self
    }
}

/// One parsed row of the term catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Tag label exactly as it appears in inbound events
    pub key: String,
    pub value: Term,
}

/// Tag label to term lookup table
pub type MappingTable = HashMap<String, Term>;

/// Raw catalog row as delivered by the catalog source
pub type CatalogRecord = BTreeMap<String, String>;

/// Inbound video update event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl VideoEvent {
    pub fn new(uuid: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            uuid: uuid.into(),
            tags,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Confidence and relevance attached to a resolved tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub confidence: i32,
    pub relevance: i32,
}

/// Score given to every resolved tag
pub const DEFAULT_SCORE: Score = Score {
    confidence: 90,
    relevance: 90,
};

/// A resolved tag inside a content document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub term: Term,
    pub score: Score,
}

/// Content reference document sent downstream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDocument {
    /// Resolved tags, in the order they appeared on the event
    pub tags: Vec<TagEntry>,
    /// Never populated from input today; serialized with empty attributes
    pub primary_section: Option<Term>,
}

/// JSON envelope posted to the notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEnvelope {
    pub uuid: String,
    /// Base64 of the serialized content document
    pub value: String,
}

/// Result of handling a single notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Document built and accepted by the notifier
    Delivered { uuid: String, tag_count: usize },
    /// Event carried no tags; nothing was sent
    NoTags { uuid: String },
}
