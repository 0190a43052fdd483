//! The `Format` trait
//!
//! A format reads text into a block [`Document`], writes a document out as
//! text, or both. Reading legacy HTML is where migration happens; writing is
//! used for content.json, rendered pages and the inspection tree.

use crate::error::FormatError;
use crate::ir::nodes::Document;
use std::collections::HashMap;

/// A named text representation of block documents
///
/// Only `name` is required. A format opts into each direction with
/// `supports_parsing` / `supports_serialization`; the default bodies of
/// `parse` and `serialize` refuse.
///
/// ```ignore
/// struct BlockCount;
///
/// impl Format for BlockCount {
///     fn name(&self) -> &str {
///         "count"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
///         Ok(doc.blocks.len().to_string())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Name used to select the format, e.g. `"json"`
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Extensions (no leading dot) that select this format for an input file
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' cannot be read",
            self.name()
        )))
    }

    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' cannot be written",
            self.name()
        )))
    }

    /// Write with format-specific parameters (the CLI's `--extra-*` flags).
    ///
    /// Formats without parameters keep this default, which accepts an empty
    /// map only.
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        match options.keys().next() {
            None => self.serialize(doc),
            Some(key) => Err(FormatError::NotSupported(format!(
                "Format '{}' has no parameter '{key}'",
                self.name()
            ))),
        }
    }
}
