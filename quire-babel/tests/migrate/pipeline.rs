//! End-to-end migration tests (legacy page HTML → block tree)

use quire_babel::formats::html::document::{extract_body, scan_heading_colors};
use quire_babel::ir::nodes::{Block, BlockKind, ColorToken, InlineContent};
use quire_babel::migrate::{migrate_html, reclassify};

const LESSON: &str = include_str!("fixtures/lesson.html");

fn heading_color(block: &Block) -> Option<ColorToken> {
    match &block.kind {
        BlockKind::Heading {
            background_color, ..
        } => *background_color,
        other => panic!("expected heading, got {other:?}"),
    }
}

// ============================================================================
// FIXTURE PAGE
// ============================================================================

#[test]
fn test_lesson_block_types() {
    let blocks = migrate_html(LESSON);
    let types: Vec<&str> = blocks.iter().map(Block::type_name).collect();

    assert_eq!(
        types,
        [
            "paragraph",
            "paragraph",
            "heading",
            "terminal",
            "paragraph",
            "heading",
            "terminal",
            "callout",
            "divider",
            "video",
            "terminal",
            "codeBlock",
            "callout",
            "paragraph",
            "bulletListItem",
            "bulletListItem",
        ]
    );
}

#[test]
fn test_lesson_drops_title_and_subtitle() {
    let blocks = migrate_html(LESSON);
    let text: String = blocks.iter().map(Block::plain_text).collect();
    assert!(!text.contains("Intro to Git"));
    assert!(!text.contains("Version control basics"));
    assert_eq!(blocks[0].plain_text(), "Git tracks changes to files.");
}

#[test]
fn test_lesson_headings() {
    let blocks = migrate_html(LESSON);
    assert!(blocks[1].is_empty_paragraph());
    assert_eq!(heading_color(&blocks[2]), Some(ColorToken::Yellow));
    assert!(blocks[4].is_empty_paragraph());
    assert_eq!(heading_color(&blocks[5]), Some(ColorToken::Red));
}

#[test]
fn test_lesson_terminals() {
    let blocks = migrate_html(LESSON);
    assert_eq!(blocks[3], Block::terminal("Terminal", "sudo apt install git"));
    assert_eq!(
        blocks[6],
        Block::terminal("Open a PowerShell terminal and run:", "winget install git")
    );
    assert_eq!(blocks[10], Block::terminal("Repository", ".git/\nREADME.md"));
}

#[test]
fn test_lesson_widgets() {
    let blocks = migrate_html(LESSON);
    assert_eq!(
        blocks[7],
        Block::callout(
            "📌",
            vec![InlineContent::text("Restart your shell afterwards.")]
        )
    );
    assert_eq!(blocks[8], Block::divider());
    assert_eq!(
        blocks[9],
        Block::video("https://player.example.com/embed/42", "")
    );
    assert_eq!(blocks[11], Block::code_block("diff", "-a\n+b"));
    assert_eq!(
        blocks[12],
        Block::callout("⚠️", vec![InlineContent::text("Never commit secrets.")])
    );
}

#[test]
fn test_unknown_widget_degrades_to_paragraph() {
    let blocks = migrate_html(LESSON);
    let carousel = &blocks[13];
    assert_eq!(carousel.type_name(), "paragraph");
    assert!(carousel.plain_text().contains("carousel"));
}

#[test]
fn test_layout_wrapper_does_not_hide_the_page() {
    let wrapped = LESSON
        .replace("<body>", r#"<body><div class="content">"#)
        .replace("</body>", "</div></body>");
    let expected = migrate_html(LESSON);
    let blocks = migrate_html(&wrapped);

    let types = |blocks: &[Block]| -> Vec<String> {
        blocks.iter().map(|b| b.type_name().to_string()).collect()
    };
    assert_eq!(types(&blocks), types(&expected));
    for (got, want) in blocks.iter().zip(&expected) {
        assert_eq!(got.plain_text(), want.plain_text());
    }
    assert_eq!(heading_color(&blocks[2]), Some(ColorToken::Yellow));
}

#[test]
fn test_widget_inside_wrapper_keeps_its_siblings() {
    let blocks = migrate_html(
        r#"<body><div class="lesson-content"><h2>Setup</h2><p>Install the tools.</p><div class="code-block"><pre><code class="language-rust">fn main() {}</code></pre></div><p>Done.</p></div></body>"#,
    );
    let types: Vec<&str> = blocks.iter().map(Block::type_name).collect();
    assert_eq!(
        types,
        ["paragraph", "heading", "paragraph", "codeBlock", "paragraph"]
    );
    assert!(blocks[0].is_empty_paragraph());
    assert_eq!(blocks[1].plain_text(), "Setup");
    assert_eq!(blocks[2].plain_text(), "Install the tools.");
    assert_eq!(blocks[3], Block::code_block("rust", "fn main() {}"));
    assert_eq!(blocks[4].plain_text(), "Done.");
}

#[test]
fn test_terminal_widget_followed_by_code() {
    let blocks = migrate_html(
        r#"<div class="terminal-block"><span class="terminal-title">Setup</span><pre><code>npm ci</code></pre></div><pre><code class="language-js">run()</code></pre>"#,
    );
    assert_eq!(
        blocks,
        vec![
            Block::terminal("Setup", "npm ci"),
            Block::code_block("js", "run()"),
        ]
    );
}

#[test]
fn test_code_block_inside_callout_wins() {
    let blocks = migrate_html(
        r#"<div class="callout"><span class="callout-emoji">💡</span><div class="code-block"><pre><code class="language-py">print(1)</code></pre></div></div>"#,
    );
    assert_eq!(blocks, vec![Block::code_block("py", "print(1)")]);
}

// ============================================================================
// DOCUMENTED EXAMPLES
// ============================================================================

#[test]
fn test_extract_body_example() {
    let html = r#"<html><body><h1>T</h1><p class="subtitle">S</p><p>X</p></body></html>"#;
    assert_eq!(extract_body(html), "<p>X</p>");
}

#[test]
fn test_spurious_header_example() {
    let baseline = vec![
        Block::text_paragraph("JavaScript 12"),
        Block::code_block("js", "x=1"),
    ];
    assert_eq!(
        reclassify(&baseline, &Default::default()),
        vec![Block::code_block("js", "x=1")]
    );
}

#[test]
fn test_bash_example() {
    assert_eq!(
        reclassify(&[Block::code_block("bash", "ls -la")], &Default::default()),
        vec![Block::terminal("Terminal", "ls -la")]
    );
}

#[test]
fn test_video_marker_example() {
    let blocks = migrate_html("<p>VIDEO_EMBED:::https://example.com/v</p>");
    assert_eq!(blocks, vec![Block::video("https://example.com/v", "")]);
}

#[test]
fn test_scanner_reads_original_page() {
    let colors = scan_heading_colors(LESSON);
    assert_eq!(colors.get(&2).map(String::as_str), Some("#fbeeb8"));
    assert_eq!(colors.get(&3).map(String::as_str), Some("#e03e2d"));
    assert!(!colors.contains_key(&1));
}

// ============================================================================
// DEGENERATE INPUT
// ============================================================================

#[test]
fn test_empty_and_garbage_input() {
    assert!(migrate_html("").is_empty());
    assert!(migrate_html("<html><head></head><body></body></html>").is_empty());

    let blocks = migrate_html("<p>unclosed <b>bold <div class='callout'>");
    assert!(!blocks.is_empty());
}

#[test]
fn test_migration_is_deterministic() {
    assert_eq!(migrate_html(LESSON), migrate_html(LESSON));
}
