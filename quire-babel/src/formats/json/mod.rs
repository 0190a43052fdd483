//! Canonical JSON document format
//!
//! This is the stored `content.json` shape:
//!
//! ```text
//! { "coverImage"?: { "url": string, "position": number }, "blocks": [..] }
//! ```
//!
//! A bare top-level block array (the transitional legacy shape) is accepted
//! when parsing. Serialization always writes the wrapper object.

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// Parse stored JSON in either accepted shape
pub fn parse_document(source: &str) -> Result<Document, FormatError> {
    serde_json::from_str(source).map_err(|e| FormatError::ParseError(e.to_string()))
}

/// Serialize a document as pretty-printed canonical JSON
pub fn to_json_string(doc: &Document) -> Result<String, FormatError> {
    serde_json::to_string_pretty(doc).map_err(|e| FormatError::SerializationError(e.to_string()))
}

/// Format implementation for the canonical document JSON
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Canonical block document JSON (content.json)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parse_document(source)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        to_json_string(doc)
    }

    /// `compact=true` writes the document on a single line.
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        match options.get("compact").map(String::as_str) {
            Some("true") => serde_json::to_string(doc)
                .map_err(|e| FormatError::SerializationError(e.to_string())),
            _ => to_json_string(doc),
        }
    }
}
