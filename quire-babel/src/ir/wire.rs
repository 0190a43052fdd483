//! JSON wire shape of blocks and documents.
//!
//! Blocks are stored in the editor's own shape:
//!
//! ```text
//! { "id"?: string, "type": string, "props": {..}, "content"?: [..] | {..}, "children": [..] }
//! ```
//!
//! [`RawBlock`] mirrors that shape without interpreting it; [`Block`] converts
//! to and from it. Conversion never fails: a known `type` whose content does
//! not have the expected shape is kept as [`BlockKind::Other`] with its props
//! untouched, so nothing read from storage is lost on the way back out.

use super::nodes::{
    flatten_text, Block, BlockKind, ColorToken, CoverImage, Document, InlineContent, Props,
    TextSpan,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Untyped mirror of a stored block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default)]
    pub children: Vec<RawBlock>,
}

/// Accepted on-disk document shapes: the wrapper object, or the transitional
/// bare block array.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum DocumentRepr {
    Wrapped {
        #[serde(rename = "coverImage", default)]
        cover_image: Option<CoverImage>,
        blocks: Vec<Block>,
    },
    Bare(Vec<Block>),
}

impl From<DocumentRepr> for Document {
    fn from(repr: DocumentRepr) -> Self {
        match repr {
            DocumentRepr::Wrapped {
                cover_image,
                blocks,
            } => Document {
                cover_image,
                blocks,
            },
            DocumentRepr::Bare(blocks) => Document::new(blocks),
        }
    }
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let RawBlock {
            id,
            kind,
            mut props,
            content,
            children,
        } = raw;

        let kind = match decode_kind(&kind, &mut props, content.as_ref()) {
            Some(typed) => typed,
            None => BlockKind::Other { kind, content },
        };

        Block {
            id,
            kind,
            extra_props: props,
            children: children.into_iter().map(Block::from).collect(),
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let mut props = block.extra_props;
        let kind = block.kind.type_name().to_string();

        let content = match block.kind {
            BlockKind::Paragraph { content } => Some(inline_to_value(&content)),
            BlockKind::Heading {
                level,
                background_color,
                content,
            } => {
                props.insert("level".to_string(), json!(level));
                if let Some(color) = background_color {
                    props.insert("backgroundColor".to_string(), json!(color.as_str()));
                }
                Some(inline_to_value(&content))
            }
            BlockKind::CodeBlock { language, code } => {
                props.insert("language".to_string(), json!(language));
                Some(inline_to_value(&[InlineContent::text(code)]))
            }
            BlockKind::Terminal { title, code } => {
                props.insert("title".to_string(), json!(title));
                props.insert("code".to_string(), json!(code));
                None
            }
            BlockKind::Callout { emoji, content } => {
                props.insert("emoji".to_string(), json!(emoji));
                Some(inline_to_value(&content))
            }
            BlockKind::Divider => None,
            BlockKind::Video { url, caption } | BlockKind::Image { url, caption } => {
                props.insert("url".to_string(), json!(url));
                props.insert("caption".to_string(), json!(caption));
                None
            }
            BlockKind::ListItem { content, .. } => Some(inline_to_value(&content)),
            BlockKind::Table { rows } => {
                let rows: Vec<Value> = rows
                    .iter()
                    .map(|cells| {
                        let cells: Vec<Value> =
                            cells.iter().map(|cell| inline_to_value(cell)).collect();
                        json!({ "cells": cells })
                    })
                    .collect();
                Some(json!({ "type": "tableContent", "rows": rows }))
            }
            BlockKind::Other { content, .. } => content,
        };

        RawBlock {
            id: block.id,
            kind,
            props,
            content,
            children: block.children.into_iter().map(RawBlock::from).collect(),
        }
    }
}

/// Decode the typed payload of a known block type. Props are only consumed
/// once the content has decoded, so a `None` leaves them intact.
fn decode_kind(kind: &str, props: &mut Props, content: Option<&Value>) -> Option<BlockKind> {
    let typed = match kind {
        "paragraph" => BlockKind::Paragraph {
            content: decode_inline(content)?,
        },
        "heading" => {
            let content = decode_inline(content)?;
            let level = take_level(props).unwrap_or(1);
            BlockKind::Heading {
                level,
                background_color: take_color(props, "backgroundColor"),
                content,
            }
        }
        "codeBlock" => {
            let code = flatten_text(&decode_inline(content)?);
            BlockKind::CodeBlock {
                language: take_string(props, "language").unwrap_or_default(),
                code,
            }
        }
        "terminal" => BlockKind::Terminal {
            title: take_string(props, "title").unwrap_or_default(),
            code: take_string(props, "code").unwrap_or_default(),
        },
        "callout" => {
            let content = decode_inline(content)?;
            BlockKind::Callout {
                emoji: take_string(props, "emoji").unwrap_or_default(),
                content,
            }
        }
        "divider" => BlockKind::Divider,
        "video" => BlockKind::Video {
            url: take_string(props, "url").unwrap_or_default(),
            caption: take_string(props, "caption").unwrap_or_default(),
        },
        "image" => BlockKind::Image {
            url: take_string(props, "url").unwrap_or_default(),
            caption: take_string(props, "caption").unwrap_or_default(),
        },
        "bulletListItem" | "numberedListItem" => BlockKind::ListItem {
            ordered: kind == "numberedListItem",
            content: decode_inline(content)?,
        },
        "table" => BlockKind::Table {
            rows: decode_table(content?)?,
        },
        _ => return None,
    };
    Some(typed)
}

/// Inline content may be absent, an array of spans, or a bare string.
fn decode_inline(content: Option<&Value>) -> Option<Vec<InlineContent>> {
    match content {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::String(text)) => Some(vec![InlineContent::text(text.clone())]),
        Some(value @ Value::Array(_)) => serde_json::from_value(value.clone()).ok(),
        Some(_) => None,
    }
}

#[derive(Deserialize)]
struct TableContent {
    rows: Vec<TableRow>,
}

#[derive(Deserialize)]
struct TableRow {
    cells: Vec<Vec<InlineContent>>,
}

fn decode_table(content: &Value) -> Option<Vec<Vec<Vec<InlineContent>>>> {
    let table: TableContent = serde_json::from_value(content.clone()).ok()?;
    Some(table.rows.into_iter().map(|row| row.cells).collect())
}

fn take_string(props: &mut Props, key: &str) -> Option<String> {
    match props.get(key) {
        Some(Value::String(_)) => match props.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_level(props: &mut Props) -> Option<u8> {
    let level = props
        .get("level")
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())?;
    props.remove("level");
    Some(level)
}

/// Only a value that is already a token is lifted into the typed field; any
/// other string stays in the extra props.
fn take_color(props: &mut Props, key: &str) -> Option<ColorToken> {
    let token = props.get(key)?.as_str()?.parse::<ColorToken>().ok()?;
    props.remove(key);
    Some(token)
}

fn span_to_value(span: &TextSpan) -> Value {
    let mut value = json!({
        "type": "text",
        "text": span.text,
        "styles": Value::Object(span.styles.clone()),
    });
    if let (Some(class_name), Value::Object(map)) = (&span.class_name, &mut value) {
        map.insert("className".to_string(), json!(class_name));
    }
    value
}

fn inline_to_value(content: &[InlineContent]) -> Value {
    Value::Array(
        content
            .iter()
            .map(|inline| match inline {
                InlineContent::Text(span) => span_to_value(span),
                InlineContent::Link(link) => json!({
                    "type": "link",
                    "href": link.href,
                    "content": link.content.iter().map(span_to_value).collect::<Vec<_>>(),
                }),
            })
            .collect(),
    )
}
