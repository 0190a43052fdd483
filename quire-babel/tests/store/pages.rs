//! Page persistence flows over the in-memory store

use async_trait::async_trait;
use insta::assert_snapshot;
use quire_babel::error::StoreError;
use quire_babel::ir::nodes::{Block, BlockKind, ColorToken, CoverImage, Document, InlineContent};
use quire_babel::migrate::migrate_html;
use quire_babel::store::{
    ContentStore, CoverChange, MemoryStore, PageContent, PageStore, PageUpdate, StoreLayout,
    StoredFile, WriteRequest,
};

const LEGACY_PAGE: &str = r#"<html><body>
<h1>Lesson</h1>
<p>Welcome.</p>
<pre><code class="language-bash">make</code></pre>
</body></html>"#;

fn page_store(store: MemoryStore) -> PageStore<MemoryStore> {
    PageStore::new(store)
}

#[tokio::test]
async fn test_missing_page_loads_as_none() {
    let pages = page_store(MemoryStore::new());
    assert_eq!(
        pages.load_page_content("nowhere").await.unwrap(),
        PageContent::None
    );
}

#[tokio::test]
async fn test_legacy_page_migrates_on_cover_change() {
    let store = MemoryStore::new().with_file("lessons/one/index.html", LEGACY_PAGE);
    let pages = page_store(store);

    let before = pages.load_page_content("lessons/one").await.unwrap();
    assert_eq!(before, PageContent::Html(LEGACY_PAGE.to_string()));

    let cover = CoverImage::new("/covers/one.png", 35.0);
    pages
        .save_page_cover_image("lessons/one", Some(cover.clone()))
        .await
        .unwrap();

    match pages.load_page_content("lessons/one").await.unwrap() {
        PageContent::Json(doc) => {
            assert_eq!(doc.cover_image, Some(cover));
            assert_eq!(doc.blocks, migrate_html(LEGACY_PAGE));
        }
        other => panic!("expected json content, got {other:?}"),
    }

    // legacy file is kept
    let store = pages.store();
    assert_eq!(
        store.get("lessons/one/index.html").await.as_deref(),
        Some(LEGACY_PAGE)
    );
    let commits = store.commits().await;
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].path, "lessons/one/content.json");
    assert_eq!(commits[0].message, StoreLayout::default().migrate_message);
}

#[tokio::test]
async fn test_saving_blocks_keeps_cover() {
    let existing = Document::new(vec![Block::text_paragraph("old")])
        .with_cover_image(CoverImage::new("/c.png", 50.0));
    let store = MemoryStore::new().with_file(
        "p/content.json",
        serde_json::to_string(&existing).unwrap(),
    );
    let pages = page_store(store);

    let doc = pages
        .save_page_blocks("p", vec![Block::text_paragraph("new")])
        .await
        .unwrap();

    assert_eq!(doc.cover_image, existing.cover_image);
    assert_eq!(doc.blocks, vec![Block::text_paragraph("new")]);
    let commits = pages.store().commits().await;
    assert_eq!(commits[0].message, StoreLayout::default().save_message);
}

#[tokio::test]
async fn test_saving_blocks_over_legacy_html_skips_migration() {
    let store = MemoryStore::new().with_file("p/index.html", LEGACY_PAGE);
    let pages = page_store(store);

    let doc = pages
        .save_page_blocks("p", vec![Block::divider()])
        .await
        .unwrap();
    assert_eq!(doc, Document::new(vec![Block::divider()]));
    assert_eq!(
        pages.store().commits().await[0].message,
        StoreLayout::default().save_message
    );
}

#[tokio::test]
async fn test_cover_removal_keeps_blocks() {
    let existing = Document::new(vec![Block::divider()])
        .with_cover_image(CoverImage::new("/c.png", 10.0));
    let store = MemoryStore::new().with_file(
        "p/content.json",
        serde_json::to_string(&existing).unwrap(),
    );
    let pages = page_store(store);

    let doc = pages.save_page_cover_image("p", None).await.unwrap();
    assert_eq!(doc, Document::new(vec![Block::divider()]));

    let written = pages.store().get("p/content.json").await.unwrap();
    assert!(!written.contains("coverImage"));
}

#[tokio::test]
async fn test_cover_on_empty_page_writes_empty_document() {
    let pages = page_store(MemoryStore::new());
    let doc = pages
        .save_page(
            "fresh",
            PageUpdate {
                blocks: None,
                cover: CoverChange::Set(CoverImage::new("/c.png", 0.0)),
            },
        )
        .await
        .unwrap();
    assert!(doc.blocks.is_empty());
    assert!(doc.cover_image.is_some());
}

#[tokio::test]
async fn test_bare_array_json_is_accepted() {
    let store = MemoryStore::new().with_file(
        "p/content.json",
        r#"[{"type":"paragraph","props":{},"content":"hi","children":[]}]"#,
    );
    let pages = page_store(store);

    match pages.load_page_content("p").await.unwrap() {
        PageContent::Json(doc) => {
            assert!(doc.cover_image.is_none());
            assert_eq!(doc.blocks, vec![Block::text_paragraph("hi")]);
        }
        other => panic!("expected json content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let store = MemoryStore::new().with_file("p/content.json", "{ nope");
    let pages = page_store(store);
    assert!(matches!(
        pages.load_page_content("p").await,
        Err(StoreError::Json(_))
    ));
}

#[tokio::test]
async fn test_custom_layout() {
    let layout = StoreLayout {
        json_file: "page.json".to_string(),
        html_file: "page.html".to_string(),
        save_message: "save".to_string(),
        migrate_message: "migrate".to_string(),
    };
    let store = MemoryStore::new().with_file("x/page.html", "<p>hello</p>");
    let pages = PageStore::with_layout(store, layout, Default::default());

    let doc = pages.migrate_page("x").await.unwrap();
    assert_eq!(doc.blocks, vec![Block::text_paragraph("hello")]);
    assert!(pages.store().get("x/page.json").await.is_some());
    assert_eq!(pages.store().commits().await[0].message, "migrate");
}

#[tokio::test]
async fn test_written_json_shape() {
    let pages = page_store(MemoryStore::new());
    let heading = Block::new(BlockKind::Heading {
        level: 2,
        background_color: Some(ColorToken::Green),
        content: vec![InlineContent::text("Setup")],
    });
    pages
        .save_page(
            "shape",
            PageUpdate {
                blocks: Some(vec![
                    Block::spacer(),
                    heading,
                    Block::terminal("Terminal", "ls -la"),
                ]),
                cover: CoverChange::Set(CoverImage::new("/img/c.png", 25.0)),
            },
        )
        .await
        .unwrap();

    let written = pages.store().get("shape/content.json").await.unwrap();
    assert_snapshot!(written, @r###"
    {
      "coverImage": {
        "url": "/img/c.png",
        "position": 25
      },
      "blocks": [
        {
          "type": "paragraph",
          "props": {},
          "content": [],
          "children": []
        },
        {
          "type": "heading",
          "props": {
            "backgroundColor": "green",
            "level": 2
          },
          "content": [
            {
              "styles": {},
              "text": "Setup",
              "type": "text"
            }
          ],
          "children": []
        },
        {
          "type": "terminal",
          "props": {
            "code": "ls -la",
            "title": "Terminal"
          },
          "children": []
        }
      ]
    }
    "###);
}

struct BrokenStore;

#[async_trait]
impl ContentStore for BrokenStore {
    async fn read(&self, _path: &str) -> Result<Option<StoredFile>, StoreError> {
        Ok(None)
    }

    async fn write(&self, request: WriteRequest) -> Result<(), StoreError> {
        Err(StoreError::io(
            request.path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        ))
    }
}

#[tokio::test]
async fn test_store_failures_propagate() {
    let pages = PageStore::new(BrokenStore);
    let err = pages
        .save_page_blocks("p", vec![Block::divider()])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { ref path, .. } if path == "p/content.json"));
}
