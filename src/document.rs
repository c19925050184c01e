//! Persisted document form.
//!
//! A document is the text plus one entry per paragraph carrying its stable id
//! and style overrides. Derived state (ranges, line metadata, heights) is
//! never part of it.
//!
//! Loading is lenient: documents written before paragraph records existed,
//! or with damaged records, still load. Whatever cannot be recovered is
//! replaced with defaults and logged at `warn`.
//!
//! # Examples
//!
//! ```
//! use paraflow::{Document, TextBuffer};
//!
//! let doc = Document::from_json(r#"{"text":"x\ny\nz"}"#).unwrap();
//! let buffer = TextBuffer::from_document(doc);
//! assert_eq!(buffer.paragraph_count(), 3);
//!
//! let json = buffer.to_document().to_json().unwrap();
//! let reloaded = TextBuffer::from_document(Document::from_json(&json).unwrap());
//! assert_eq!(reloaded.paragraphs(), buffer.paragraphs());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::paragraph::{IdGenerator, ParagraphId, ParagraphRecord, ParagraphStore};
use crate::style::ParagraphStyle;
use crate::text::TextBuffer;

/// Serialized text with its paragraph records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub text: String,
    #[serde(default, deserialize_with = "lenient_paragraphs")]
    pub paragraphs: Vec<StoredParagraph>,
}

/// One persisted paragraph entry.
///
/// `id` is `None` only for entries loaded without a usable id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoredParagraph {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ParagraphId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParagraphStyle>,
}

impl From<&ParagraphRecord> for StoredParagraph {
    fn from(record: &ParagraphRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            style: record.style,
        }
    }
}

impl Document {
    /// Parse a document from JSON.
    ///
    /// Only an unreadable `text` field fails; bad paragraph data is recovered.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn lenient_paragraphs<'de, D>(deserializer: D) -> std::result::Result<Vec<StoredParagraph>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = &value else {
        warn!(kind = value_kind(&value), "paragraphs is not a list, ignoring it");
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| stored_paragraph(index, entry))
        .collect())
}

fn stored_paragraph(index: usize, entry: &Value) -> StoredParagraph {
    let Value::Object(fields) = entry else {
        warn!(index, kind = value_kind(entry), "paragraph entry is not an object");
        return StoredParagraph::default();
    };

    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(ParagraphId::new(id.as_str())),
        _ => {
            warn!(index, "paragraph entry has no usable id");
            None
        }
    };

    let style = match fields.get("style") {
        None | Some(Value::Null) => None,
        Some(raw) => match ParagraphStyle::deserialize(raw) {
            Ok(style) => Some(style).filter(|style| !style.is_empty()),
            Err(err) => {
                warn!(index, error = %err, "dropping malformed paragraph style");
                None
            }
        },
    };

    StoredParagraph { id, style }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TextBuffer {
    /// Build a buffer from a loaded document.
    ///
    /// Entries without an id, or repeating an earlier id, get fresh ids. A
    /// record count that disagrees with the text is reconciled at the end.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let Document { text, paragraphs } = document;

        let mut ids = IdGenerator::new();
        for entry in &paragraphs {
            if let Some(id) = &entry.id {
                ids.observe(id);
            }
        }

        let mut seen = HashSet::with_capacity(paragraphs.len());
        let records: Vec<ParagraphRecord> = paragraphs
            .into_iter()
            .map(|entry| {
                let id = match entry.id {
                    Some(id) if seen.insert(id.clone()) => id,
                    Some(id) => {
                        warn!(%id, "duplicate paragraph id, assigning a fresh one");
                        ids.next_id()
                    }
                    None => ids.next_id(),
                };
                ParagraphRecord {
                    id,
                    style: entry.style,
                }
            })
            .collect();

        let expected = text.matches(crate::paragraph::SEPARATOR).count() + 1;
        if records.is_empty() {
            debug!(count = expected, "document has no paragraph records");
        } else if records.len() != expected {
            warn!(
                records = records.len(),
                paragraphs = expected,
                "paragraph records disagree with text, reconciling"
            );
        }

        Self::from_parts(&text, ParagraphStore::from_records(records), ids)
    }

    /// Capture the persisted form of this buffer.
    #[must_use]
    pub fn to_document(&self) -> Document {
        Document {
            text: self.to_string(),
            paragraphs: self.paragraphs().iter().map(StoredParagraph::from).collect(),
        }
    }

    /// Load a buffer from document JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Document::from_json(json).map(Self::from_document)
    }

    /// Serialize this buffer as document JSON.
    pub fn to_json(&self) -> Result<String> {
        self.to_document().to_json()
    }
}
