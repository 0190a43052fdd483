//! Format lookup by name or file extension
//!
//! The CLI picks formats by name (`--to json`) or from an input's extension,
//! so every format is reachable through one registry. `with_options` builds
//! the default set with configured migration and render settings.

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::html::{HtmlFormat, RenderOptions};
use crate::formats::json::JsonFormat;
use crate::formats::treeviz::TreevizFormat;
use crate::ir::nodes::Document;
use crate::migrate::MigrateOptions;
use std::collections::HashMap;
use std::path::Path;

/// Named formats available for conversion
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let json = registry.convert(legacy_html, "html", "json", &HashMap::new())?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// The html, json and treeviz formats with default settings
    pub fn with_defaults() -> Self {
        Self::with_options(MigrateOptions::default(), RenderOptions::default())
    }

    /// The default formats, with html using the given settings
    pub fn with_options(migrate: MigrateOptions, render: RenderOptions) -> Self {
        let mut registry = Self::new();
        registry.register(HtmlFormat::new(migrate, render));
        registry.register(JsonFormat);
        registry.register(TreevizFormat);
        registry
    }

    /// Add a format, replacing any format of the same name
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Name of the format claiming the file's extension, if any
    pub fn detect_format_from_filename(&self, filename: impl AsRef<Path>) -> Option<String> {
        let extension = filename.as_ref().extension()?.to_str()?.to_ascii_lowercase();

        let mut matches: Vec<&str> = self
            .formats
            .values()
            .filter(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name())
            .collect();
        matches.sort_unstable();
        matches.first().map(|name| name.to_string())
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' cannot be read"
            )));
        }
        fmt.parse(source)
    }

    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        self.serialize_with_options(doc, format, &HashMap::new())
    }

    pub fn serialize_with_options(
        &self,
        doc: &Document,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' cannot be written"
            )));
        }
        fmt.serialize_with_options(doc, options)
    }

    /// Parse with one format and write with another. Both names are checked
    /// before any parsing happens.
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        to: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        self.get(from)?;
        self.get(to)?;
        let doc = self.parse(source, from)?;
        self.serialize_with_options(&doc, to, options)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
