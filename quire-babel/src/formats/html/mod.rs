//! HTML format implementation
//!
//! Parsing runs the legacy page migration: a full editor page (or a body
//! fragment) becomes a typed block [`Document`]. Serialization renders a block
//! document back to a standalone, read-only HTML page.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for both directions:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: Reference-counted DOM tree implementation
//!
//! Legacy pages are hand-edited and often malformed; html5ever recovers from
//! anything a browser would, which keeps the migration total.
//!
//! # Element Mapping Table
//!
//! | Block            | Legacy HTML (import)                              | Rendered HTML (export)                         |
//! |------------------|---------------------------------------------------|------------------------------------------------|
//! | paragraph        | `<p>`, loose inline content, unknown widgets      | `<p>`                                          |
//! | heading          | `<h1>`–`<h6>` (clamped to 3)                      | `<hN data-background-color>`                   |
//! | codeBlock        | `<pre><code class="language-x">`, `div.code-block` | `<pre><code class="language-x">`             |
//! | terminal         | `div.terminal-block`, `div.file-tree`, bash code  | `div.terminal-block` with title span           |
//! | callout          | `div.callout`, `div.alert-*`                      | `div.callout` with emoji span                  |
//! | divider          | `hr.divider`, empty `div.divider`                 | `<hr class="divider">`                         |
//! | video            | `div.video-embed` (iframe / video / source)       | `div.video-embed > video`                      |
//! | list items       | `<ul>`/`<ol>`/`<li>`                              | grouped `<ul>`/`<ol>`                          |
//!
//! # Modules
//!
//! - `document`: whole-page preprocessing (body extraction, heading colours, embeds)
//! - `parser`: the generic structural parser producing the baseline block tree
//! - `serializer`: the renderer

pub mod document;
pub mod parser;
pub mod serializer;

pub use serializer::{render_blocks, render_document, RenderOptions};

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;
use crate::migrate::{migrate_html_with, MigrateOptions};
use std::collections::HashMap;

/// Format implementation for legacy page HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlFormat {
    migrate: MigrateOptions,
    render: RenderOptions,
}

impl HtmlFormat {
    pub fn new(migrate: MigrateOptions, render: RenderOptions) -> Self {
        Self { migrate, render }
    }

    pub fn migrate_options(&self) -> &MigrateOptions {
        &self.migrate
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Legacy editor HTML pages (import migrates, export renders)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(Document::new(migrate_html_with(source, &self.migrate)))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        render_document(doc, &self.render)
    }

    /// Accepts `title` and `include-cover` (`true`/`false`).
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut render = self.render.clone();
        for (key, value) in options {
            match key.as_str() {
                "title" => render.title = Some(value.clone()),
                "include-cover" => {
                    render.include_cover = value.parse().map_err(|_| {
                        FormatError::SerializationError(format!(
                            "include-cover expects true or false, got '{value}'"
                        ))
                    })?
                }
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "Unknown html parameter '{other}'"
                    )))
                }
            }
        }
        render_document(doc, &render)
    }
}
