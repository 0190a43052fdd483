//! Treeviz formatter for block documents
//!
//! Treeviz is a visual representation of the block tree, handy for checking
//! what a migration produced. Each block takes one line:
//!
//! <prefix><connector> <icon> <label> (truncated to 40 characters)
//!
//! Example:
//!
//! ```text
//! ⧉ Document (4 blocks)
//! ├─ ¶ ·
//! ├─ § h2 [green] Install
//! ├─ $ Terminal: cargo build
//! └─ • first item
//!   └─ • nested item
//! ```
//!
//! Empty paragraphs (heading spacers) are shown as `·`.

use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::{Block, BlockKind, Document};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 40;

fn block_label(block: &Block) -> String {
    let label = match &block.kind {
        BlockKind::Heading {
            level,
            background_color,
            ..
        } => match background_color {
            Some(color) => format!("h{level} [{color}] {}", block.plain_text()),
            None => format!("h{level} {}", block.plain_text()),
        },
        BlockKind::CodeBlock { language, code } => format!("{language}: {code}"),
        BlockKind::Terminal { title, code } => format!("{title}: {code}"),
        BlockKind::Callout { emoji, .. } => format!("{emoji} {}", block.plain_text()),
        BlockKind::Divider => String::new(),
        BlockKind::Video { url, .. } | BlockKind::Image { url, .. } => url.clone(),
        BlockKind::Table { rows } => format!("{} rows", rows.len()),
        BlockKind::Other { kind, .. } => kind.clone(),
        BlockKind::Paragraph { .. } if block.is_empty_paragraph() => "·".to_string(),
        _ => block.plain_text(),
    };
    truncate(&label.replace('\n', "↵"))
}

fn truncate(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        return label.to_string();
    }
    let mut short: String = label.chars().take(LABEL_WIDTH - 1).collect();
    short.push('…');
    short
}

fn format_block(block: &Block, prefix: &str, is_last: bool, show_props: bool) -> String {
    let connector = if is_last { "└─" } else { "├─" };
    let mut output = format!(
        "{prefix}{connector} {} {}\n",
        get_icon(block.type_name()),
        block_label(block)
    );

    let child_prefix = format!("{prefix}{}", if is_last { "  " } else { "│ " });

    if show_props {
        for (key, value) in &block.extra_props {
            output.push_str(&format!("{child_prefix}· {key}={value}\n"));
        }
    }

    output + &format_children(&block.children, &child_prefix, show_props)
}

fn format_children(children: &[Block], prefix: &str, show_props: bool) -> String {
    let count = children.len();
    children
        .iter()
        .enumerate()
        .map(|(i, child)| format_block(child, prefix, i + 1 == count, show_props))
        .collect()
}

pub fn to_treeviz_str(doc: &Document) -> String {
    to_treeviz_str_with_params(doc, &HashMap::new())
}

/// Convert a document to treeviz string with optional parameters
///
/// # Parameters
///
/// - `"show-props"`: when `"true"`, lists each block's untyped props under it
pub fn to_treeviz_str_with_params(doc: &Document, params: &HashMap<String, String>) -> String {
    let show_props = params
        .get("show-props")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let mut output = format!(
        "{} Document ({} blocks)\n",
        get_icon("document"),
        doc.blocks.len()
    );
    if let Some(cover) = &doc.cover_image {
        output.push_str(&format!(
            "{} cover {} @ {}%\n",
            get_icon("cover"),
            cover.url,
            cover.position
        ));
    }

    output + &format_children(&doc.blocks, "", show_props)
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc))
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        Ok(to_treeviz_str_with_params(doc, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::{ColorToken, InlineContent};
    use serde_json::json;

    fn sample() -> Document {
        let heading = Block::new(BlockKind::Heading {
            level: 2,
            background_color: Some(ColorToken::Green),
            content: vec![InlineContent::text("Install")],
        });
        let item = |text: &str| {
            Block::new(BlockKind::ListItem {
                ordered: false,
                content: vec![InlineContent::text(text)],
            })
        };
        Document::new(vec![
            Block::spacer(),
            heading,
            Block::terminal("Terminal", "cargo build"),
            item("first item").with_children(vec![item("nested item")]),
        ])
    }

    #[test]
    fn test_tree_shape() {
        insta::assert_snapshot!(to_treeviz_str(&sample()), @r###"
        ⧉ Document (4 blocks)
        ├─ ¶ ·
        ├─ § h2 [green] Install
        ├─ $ Terminal: cargo build
        └─ • first item
          └─ • nested item
        "###);
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let doc = Document::new(vec![Block::text_paragraph("x".repeat(100))]);
        let output = to_treeviz_str(&doc);
        let line = output.lines().nth(1).unwrap();
        assert!(line.ends_with('…'));
        assert_eq!(line.chars().count(), "└─ ¶ ".chars().count() + LABEL_WIDTH);
    }

    #[test]
    fn test_show_props() {
        let mut block = Block::text_paragraph("centered");
        block
            .extra_props
            .insert("textAlignment".to_string(), json!("center"));
        let mut params = HashMap::new();
        params.insert("show-props".to_string(), "true".to_string());

        let output = to_treeviz_str_with_params(&Document::new(vec![block]), &params);
        assert!(output.contains("  · textAlignment=\"center\""));
    }
}
