//! Legacy page migration into structured block documents
//!
//!     Pages written with the old rich-text editor are stored as full HTML documents, with custom
//!     widgets (terminals, callouts, code blocks, alerts, file trees, diffs, embeds) encoded as
//!     CSS-classed markup. The block editor wants a typed block tree instead. This crate converts
//!     the former into the latter, stores the result, and renders block documents back to HTML
//!     for read-only display.
//!
//!     This is a pure lib: it powers quire-cli but is shell agnostic, so no code here prints,
//!     reads env vars or assumes a terminal.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # FormatError, StoreError
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── ir                      # Block document model and its JSON wire shape
//!     ├── common                  # Entity decoding, colour token mapping
//!     ├── formats
//!     │   ├── html                # Page preprocessing, structural parser, renderer
//!     │   ├── json                # Canonical content.json
//!     │   └── treeviz             # Tree view for inspection
//!     ├── migrate                 # The migration pipeline and block reclassification
//!     └── store                   # Page persistence over a content store
//!
//! Migration pipeline
//!
//!     raw page HTML
//!       → heading colours scanned from the page's <style> block
//!       → body extracted (page chrome, title and subtitle dropped)
//!       → video embeds rewritten to marker paragraphs
//!       → generic structural parse into a baseline block tree
//!       → reclassification into the editor's closed block set
//!
//!     Every step is total: malformed markup degrades to paragraphs, never to an error. The
//!     legacy HTML is never deleted, as migration is lossy for widgets nobody recognises.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs                  # wires the subdirectories
//!     ├── migrate                 # pipeline properties and fixtures
//!     └── store                   # persistence flows
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include
//!     these in the mod.

pub mod error;
pub mod format;
pub mod formats;
pub mod migrate;
pub mod registry;
pub mod store;

pub mod common;
pub mod ir;

pub use error::{FormatError, StoreError};
pub use format::Format;
pub use ir::nodes::{Block, BlockKind, ColorToken, CoverImage, Document, InlineContent};
pub use migrate::{migrate_html, migrate_html_with, MigrateOptions};
pub use registry::FormatRegistry;
pub use store::{ContentStore, PageContent, PageStore, StoreLayout};
