//! Page persistence over a versioned content store.
//!
//! Each page lives under a content path with two fixed files: the canonical
//! `content.json` document and the legacy `index.html` it may have been
//! migrated from. A page is in one of three states on read:
//!
//! ```text
//! NONE ──save──▶ JSON
//! HTML ──save──▶ JSON (+ the untouched HTML)
//! ```
//!
//! Writes always produce canonical JSON and never delete the legacy HTML,
//! which stays behind as the fallback for lossy migrations.
//!
//! Saves are read-modify-write without locking: two concurrent saves of the
//! same page both read the old state and the last write wins, including its
//! view of the cover image.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::ir::nodes::{Block, CoverImage, Document};
use crate::migrate::{migrate_html_with, MigrateOptions};
use async_trait::async_trait;
use tracing::{debug, info};

/// A file read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
}

/// A versioned write. `message` is commit metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub path: String,
    pub content: String,
    pub message: String,
}

/// The external content store.
///
/// A missing file reads as `Ok(None)`; every other failure is an error and is
/// passed to the caller unchanged.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    async fn write(&self, request: WriteRequest) -> Result<(), StoreError>;
}

/// File names and commit messages used for pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub json_file: String,
    pub html_file: String,
    pub save_message: String,
    pub migrate_message: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        StoreLayout {
            json_file: "content.json".to_string(),
            html_file: "index.html".to_string(),
            save_message: "Update page content".to_string(),
            migrate_message: "Migrate page content to blocks".to_string(),
        }
    }
}

impl StoreLayout {
    pub fn json_path(&self, content_path: &str) -> String {
        join(content_path, &self.json_file)
    }

    pub fn html_path(&self, content_path: &str) -> String {
        join(content_path, &self.html_file)
    }
}

fn join(content_path: &str, file: &str) -> String {
    let dir = content_path.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// What a page currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    None,
    Json(Document),
    Html(String),
}

impl PageContent {
    /// `none`, `json` or `html`.
    pub fn format(&self) -> &'static str {
        match self {
            PageContent::None => "none",
            PageContent::Json(_) => "json",
            PageContent::Html(_) => "html",
        }
    }
}

/// Cover image part of a save.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CoverChange {
    /// Keep whatever cover the stored JSON has
    #[default]
    Keep,
    Set(CoverImage),
    Remove,
}

/// A save request. `blocks: None` keeps the page's current blocks, migrating
/// legacy HTML to get them if needed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageUpdate {
    pub blocks: Option<Vec<Block>>,
    pub cover: CoverChange,
}

/// Load and save pages through a [`ContentStore`].
pub struct PageStore<S> {
    store: S,
    layout: StoreLayout,
    migrate: MigrateOptions,
}

impl<S: ContentStore> PageStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_layout(store, StoreLayout::default(), MigrateOptions::default())
    }

    pub fn with_layout(store: S, layout: StoreLayout, migrate: MigrateOptions) -> Self {
        PageStore {
            store,
            layout,
            migrate,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Read a page: canonical JSON first, then legacy HTML.
    pub async fn load_page_content(&self, content_path: &str) -> Result<PageContent, StoreError> {
        let json_path = self.layout.json_path(content_path);
        if let Some(file) = self.store.read(&json_path).await? {
            debug!(path = %json_path, "loaded canonical content");
            let doc: Document = serde_json::from_str(&file.content)?;
            return Ok(PageContent::Json(doc));
        }

        let html_path = self.layout.html_path(content_path);
        if let Some(file) = self.store.read(&html_path).await? {
            debug!(path = %html_path, "loaded legacy content");
            return Ok(PageContent::Html(file.content));
        }

        debug!(content_path, "page has no content");
        Ok(PageContent::None)
    }

    /// Save new blocks, keeping the stored cover image.
    pub async fn save_page_blocks(
        &self,
        content_path: &str,
        blocks: Vec<Block>,
    ) -> Result<Document, StoreError> {
        let update = PageUpdate {
            blocks: Some(blocks),
            cover: CoverChange::Keep,
        };
        self.save_page(content_path, update).await
    }

    /// Set (`Some`) or remove (`None`) the cover image, keeping the blocks.
    pub async fn save_page_cover_image(
        &self,
        content_path: &str,
        cover: Option<CoverImage>,
    ) -> Result<Document, StoreError> {
        let cover = match cover {
            Some(cover) => CoverChange::Set(cover),
            None => CoverChange::Remove,
        };
        let update = PageUpdate { blocks: None, cover };
        self.save_page(content_path, update).await
    }

    /// Migrate a page to canonical JSON without changing it otherwise.
    pub async fn migrate_page(&self, content_path: &str) -> Result<Document, StoreError> {
        self.save_page(content_path, PageUpdate::default()).await
    }

    /// Write a page's canonical JSON and return the document written.
    pub async fn save_page(
        &self,
        content_path: &str,
        update: PageUpdate,
    ) -> Result<Document, StoreError> {
        let current = self.load_page_content(content_path).await?;

        let (stored_blocks, stored_cover, migrated) = match current {
            PageContent::Json(doc) => (Some(doc.blocks), doc.cover_image, false),
            PageContent::Html(html) if update.blocks.is_none() => {
                info!(content_path, "migrating legacy page");
                (Some(migrate_html_with(&html, &self.migrate)), None, true)
            }
            PageContent::Html(_) | PageContent::None => (None, None, false),
        };

        let blocks = update.blocks.or(stored_blocks).unwrap_or_default();
        let cover_image = match update.cover {
            CoverChange::Keep => stored_cover,
            CoverChange::Set(cover) => Some(cover),
            CoverChange::Remove => None,
        };
        let doc = Document {
            cover_image,
            blocks,
        };

        let message = if migrated {
            &self.layout.migrate_message
        } else {
            &self.layout.save_message
        };
        let request = WriteRequest {
            path: self.layout.json_path(content_path),
            content: serde_json::to_string_pretty(&doc)?,
            message: message.clone(),
        };

        info!(path = %request.path, blocks = doc.blocks.len(), "saving page");
        self.store.write(request).await?;
        Ok(doc)
    }
}
