//! Term catalog parsing
//!
//! Each catalog record names a tag label (`brightcovesearchterm`) and a stream URL
//! whose last path segment is the term ID. The term ID ends with `-<base64 taxonomy>`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

use crate::model::{CatalogRecord, MappingEntry, MappingTable, Term};

pub const SEARCH_TERM_FIELD: &str = "brightcovesearchterm";
pub const STREAM_URL_FIELD: &str = "streamurl";

/// Reasons a single catalog record is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Couldn't find {field} in mapping: [{record:?}]")]
    MissingField {
        field: &'static str,
        record: CatalogRecord,
    },
    #[error("Couldn't parse term ID from streamURL: [{0}]")]
    InvalidStreamUrl(String),
    #[error("Couldn't decode taxonomy name from term ID: [{0}]")]
    InvalidTermId(String),
    #[error("Couldn't decode taxonomy name from term ID: [{term_id}]. [{reason}]")]
    InvalidTaxonomy { term_id: String, reason: String },
}

/// Outcome of parsing a whole catalog
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub table: MappingTable,
    /// Records dropped because they could not be parsed
    pub rejected: usize,
}

/// Parse one catalog record into a mapping entry
pub fn parse_entry(record: &CatalogRecord) -> Result<MappingEntry, EntryError> {
    let search_term = required_field(record, SEARCH_TERM_FIELD)?;
    let stream_url = required_field(record, STREAM_URL_FIELD)?;

    let term_id = match stream_url.rsplit_once('/') {
        Some((_, id)) if !id.is_empty() => id,
        _ => return Err(EntryError::InvalidStreamUrl(stream_url.to_string())),
    };

    let taxonomy = decode_taxonomy(term_id)?;

    Ok(MappingEntry {
        key: search_term.to_string(),
        value: Term::new(term_id, taxonomy),
    })
}

/// Decode the taxonomy name carried after the last `-` of a term ID
pub fn decode_taxonomy(term_id: &str) -> Result<String, EntryError> {
    let encoded = match term_id.rsplit_once('-') {
        Some((_, encoded)) if !encoded.is_empty() => encoded,
        _ => return Err(EntryError::InvalidTermId(term_id.to_string())),
    };

    let invalid = |reason: String| EntryError::InvalidTaxonomy {
        term_id: term_id.to_string(),
        reason,
    };

    let bytes = STANDARD.decode(encoded).map_err(|e| invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
}

/// Build a mapping table from raw records, dropping the ones that don't parse.
///
/// Records are applied in source order, so for duplicate keys the last record wins.
pub fn build_table(records: &[CatalogRecord]) -> ParsedCatalog {
    records
        .iter()
        .fold(ParsedCatalog::default(), |mut parsed, record| {
            match parse_entry(record) {
                Ok(entry) => {
                    if let Some(previous) = parsed.table.insert(entry.key.clone(), entry.value) {
                        tracing::debug!(
                            key = %entry.key,
                            replaced_id = %previous.id,
                            "Duplicate catalog key, keeping the later record"
                        );
                    }
                }
                Err(e) => {
                    tracing::info!(error = %e, "Skipping malformed catalog record");
                    parsed.rejected += 1;
                }
            }
            parsed
        })
}

fn required_field<'a>(
    record: &'a CatalogRecord,
    field: &'static str,
) -> Result<&'a str, EntryError> {
    record
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| EntryError::MissingField {
            field,
            record: record.clone(),
        })
}
