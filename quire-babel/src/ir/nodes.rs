//! Core data structures for the block document model.
//!
//! A document is an ordered list of [`Block`]s. Each block has a closed-set
//! [`BlockKind`] carrying the typed payload the editor understands, plus the
//! untyped leftovers in [`Block::extra_props`] so that loading and saving a
//! document written by the editor keeps every attribute it set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::wire::{DocumentRepr, RawBlock};

/// Untyped block props and inline styles.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// The persisted page document: an optional cover image and the block tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentRepr")]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<CoverImage>,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document {
            cover_image: None,
            blocks,
        }
    }

    pub fn with_cover_image(mut self, cover_image: CoverImage) -> Self {
        self.cover_image = Some(cover_image);
        self
    }
}

/// Cover image shown above a page. `position` is the vertical focus in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    pub url: String,
    #[serde(serialize_with = "serialize_position")]
    pub position: f64,
}

/// Whole positions are written as integers, the way the editor stores them.
fn serialize_position<S>(position: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if position.fract() == 0.0 && position.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*position as i64)
    } else {
        serializer.serialize_f64(*position)
    }
}

impl CoverImage {
    pub fn new(url: impl Into<String>, position: f64) -> Self {
        CoverImage {
            url: url.into(),
            position,
        }
    }
}

/// A node in the block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: Option<String>,
    pub kind: BlockKind,
    /// Props the typed variant does not model, carried through unchanged.
    pub extra_props: Props,
    pub children: Vec<Block>,
}

/// The closed set of block types, with their typed payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph {
        content: Vec<InlineContent>,
    },
    Heading {
        level: u8,
        background_color: Option<ColorToken>,
        content: Vec<InlineContent>,
    },
    CodeBlock {
        language: String,
        code: String,
    },
    Terminal {
        title: String,
        code: String,
    },
    Callout {
        emoji: String,
        content: Vec<InlineContent>,
    },
    Divider,
    Video {
        url: String,
        caption: String,
    },
    ListItem {
        ordered: bool,
        content: Vec<InlineContent>,
    },
    Image {
        url: String,
        caption: String,
    },
    Table {
        rows: Vec<Vec<Vec<InlineContent>>>,
    },
    /// A block type this crate does not interpret, passed through verbatim.
    Other {
        kind: String,
        content: Option<serde_json::Value>,
    },
}

impl BlockKind {
    /// The `type` tag used on the wire.
    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::CodeBlock { .. } => "codeBlock",
            BlockKind::Terminal { .. } => "terminal",
            BlockKind::Callout { .. } => "callout",
            BlockKind::Divider => "divider",
            BlockKind::Video { .. } => "video",
            BlockKind::ListItem { ordered: false, .. } => "bulletListItem",
            BlockKind::ListItem { ordered: true, .. } => "numberedListItem",
            BlockKind::Image { .. } => "image",
            BlockKind::Table { .. } => "table",
            BlockKind::Other { kind, .. } => kind,
        }
    }

    /// Inline content for block types whose content mode is `inline`.
    pub fn inline_content(&self) -> Option<&[InlineContent]> {
        match self {
            BlockKind::Paragraph { content }
            | BlockKind::Heading { content, .. }
            | BlockKind::Callout { content, .. }
            | BlockKind::ListItem { content, .. } => Some(content),
            _ => None,
        }
    }
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Block {
            id: None,
            kind,
            extra_props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn paragraph(content: Vec<InlineContent>) -> Self {
        Block::new(BlockKind::Paragraph { content })
    }

    /// A paragraph holding a single unstyled text span.
    pub fn text_paragraph(text: impl Into<String>) -> Self {
        Block::paragraph(vec![InlineContent::text(text)])
    }

    /// The empty paragraph used as a spacer before headings.
    pub fn spacer() -> Self {
        Block::paragraph(Vec::new())
    }

    pub fn heading(level: u8, content: Vec<InlineContent>) -> Self {
        Block::new(BlockKind::Heading {
            level,
            background_color: None,
            content,
        })
    }

    pub fn code_block(language: impl Into<String>, code: impl Into<String>) -> Self {
        Block::new(BlockKind::CodeBlock {
            language: language.into(),
            code: code.into(),
        })
    }

    pub fn terminal(title: impl Into<String>, code: impl Into<String>) -> Self {
        Block::new(BlockKind::Terminal {
            title: title.into(),
            code: code.into(),
        })
    }

    pub fn callout(emoji: impl Into<String>, content: Vec<InlineContent>) -> Self {
        Block::new(BlockKind::Callout {
            emoji: emoji.into(),
            content,
        })
    }

    pub fn divider() -> Self {
        Block::new(BlockKind::Divider)
    }

    pub fn video(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Block::new(BlockKind::Video {
            url: url.into(),
            caption: caption.into(),
        })
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Concatenated text of the block's inline content, or the code of a
    /// code-like block. Empty for props-only blocks.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::CodeBlock { code, .. } | BlockKind::Terminal { code, .. } => code.clone(),
            kind => kind
                .inline_content()
                .map(flatten_text)
                .unwrap_or_default(),
        }
    }

    /// True for a paragraph with no visible text.
    pub fn is_empty_paragraph(&self) -> bool {
        match &self.kind {
            BlockKind::Paragraph { content } => {
                self.children.is_empty() && flatten_text(content).is_empty()
            }
            _ => false,
        }
    }
}

/// Inline content of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineContent {
    Text(TextSpan),
    Link(Link),
}

impl InlineContent {
    pub fn text(text: impl Into<String>) -> Self {
        InlineContent::Text(TextSpan::plain(text))
    }
}

/// A run of text with its styles (`bold`, `italic`, `textColor`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub text: String,
    #[serde(default)]
    pub styles: Props,
    /// CSS class of the element this span was lifted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        TextSpan {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub content: Vec<TextSpan>,
}

/// Concatenate the text of a run of inline content, ignoring styles.
pub fn flatten_text(content: &[InlineContent]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            InlineContent::Text(span) => out.push_str(&span.text),
            InlineContent::Link(link) => {
                for span in &link.content {
                    out.push_str(&span.text);
                }
            }
        }
    }
    out
}

/// The ten colour names understood by the editor's styling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Default,
    Gray,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl ColorToken {
    pub const ALL: [ColorToken; 10] = [
        ColorToken::Default,
        ColorToken::Gray,
        ColorToken::Brown,
        ColorToken::Red,
        ColorToken::Orange,
        ColorToken::Yellow,
        ColorToken::Green,
        ColorToken::Blue,
        ColorToken::Purple,
        ColorToken::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Default => "default",
            ColorToken::Gray => "gray",
            ColorToken::Brown => "brown",
            ColorToken::Red => "red",
            ColorToken::Orange => "orange",
            ColorToken::Yellow => "yellow",
            ColorToken::Green => "green",
            ColorToken::Blue => "blue",
            ColorToken::Purple => "purple",
            ColorToken::Pink => "pink",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of a token name. Use [`crate::common::color::map_color`] for
/// arbitrary CSS colours.
impl FromStr for ColorToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorToken::ALL
            .iter()
            .copied()
            .find(|token| token.as_str() == s)
            .ok_or_else(|| format!("unknown colour token '{s}'"))
    }
}
