//! Content document construction and serialization
//!
//! The XML produced here is consumed byte-for-byte by the downstream notifier, so
//! element order, attribute order and escaping must stay fixed.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt::{self, Write as _};
use thiserror::Error;

use crate::model::{
    ContentDocument, DEFAULT_SCORE, MappingTable, PublicationEnvelope, TagEntry, Term,
};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML Marshalling: [{0}]")]
    Xml(#[from] fmt::Error),
    #[error("JSON Marshalling: [{0}]")]
    Json(#[from] serde_json::Error),
}

/// Resolve tags against a mapping table, in order, dropping the unmapped ones
pub fn build_document(
    tags: &[String],
    table: &MappingTable,
    transaction_id: &str,
) -> ContentDocument {
    let tags = tags
        .iter()
        .filter_map(|tag| match table.get(tag) {
            Some(term) => Some(TagEntry {
                term: term.clone(),
                score: DEFAULT_SCORE,
            }),
            None => {
                tracing::info!(
                    transaction_id = %transaction_id,
                    tag = %tag,
                    "Tag has no term mapping"
                );
                None
            }
        })
        .collect();

    ContentDocument {
        tags,
        primary_section: None,
    }
}

impl ContentDocument {
    /// Serialize to the content reference XML schema
    pub fn to_xml(&self) -> Result<String, DocumentError> {
        let mut out = String::with_capacity(128 + self.tags.len() * 192);

        out.push_str("<contentRef><tags>");
        for entry in &self.tags {
            out.push_str("<tag>");
            write_term(&mut out, "term", &entry.term)?;
            write!(
                out,
                r#"<score confidence="{}" relevance="{}"></score>"#,
                entry.score.confidence, entry.score.relevance
            )?;
            out.push_str("</tag>");
        }
        out.push_str("</tags>");

        let unset = Term::default();
        write_term(
            &mut out,
            "primarySection",
            self.primary_section.as_ref().unwrap_or(&unset),
        )?;
        out.push_str("</contentRef>");

        Ok(out)
    }

    /// Standard, padded base64 of the XML form
    pub fn encode(&self) -> Result<String, DocumentError> {
        Ok(STANDARD.encode(self.to_xml()?))
    }
}

impl PublicationEnvelope {
    pub fn from_document(
        uuid: impl Into<String>,
        document: &ContentDocument,
    ) -> Result<Self, DocumentError> {
        Ok(Self {
            uuid: uuid.into(),
            value: document.encode()?,
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn write_term(out: &mut String, element: &str, term: &Term) -> fmt::Result {
    write!(
        out,
        r#"<{element} taxonomy="{}" id="{}">"#,
        Escaped(&term.taxonomy),
        Escaped(&term.id)
    )?;
    if let Some(name) = term.canonical_name.as_deref().filter(|n| !n.is_empty()) {
        write!(out, "<canonicalName>{}</canonicalName>", Escaped(name))?;
    }
    write!(out, "</{element}>")
}

/// XML-escaped text, valid both as character data and inside a quoted attribute
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("&#34;")?,
                '\'' => f.write_str("&#39;")?,
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '\t' => f.write_str("&#x9;")?,
                '\n' => f.write_str("&#xA;")?,
                '\r' => f.write_str("&#xD;")?,
                c if is_xml_char(c) => f.write_char(c)?,
                _ => f.write_char(char::REPLACEMENT_CHARACTER)?,
            }
        }
        Ok(())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
