//! HTML rendering (block tree → HTML, read-only display)
//!
//! Builds an RcDom from the block tree and serializes it with html5ever.
//! Widget blocks are rendered with the same markup the legacy editor used, so
//! a rendered page fed back through the migration yields the same block types.

use crate::error::FormatError;
use crate::ir::nodes::{Block, BlockKind, CoverImage, Document, InlineContent, TextSpan};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Options for full-page rendering
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Page title, rendered as the `<title>` and a leading `<h1>`
    pub title: Option<String>,
    /// Render the cover image figure when the document has one
    pub include_cover: bool,
}

impl RenderOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_cover(mut self, include_cover: bool) -> Self {
        self.include_cover = include_cover;
        self
    }
}

/// Render a block list as an HTML fragment
pub fn render_blocks(blocks: &[Block]) -> Result<String, FormatError> {
    let root = create_element("div", vec![]);
    append_blocks(&root, blocks);
    serialize_children(&root)
}

/// Render a document as a complete HTML page with embedded CSS
pub fn render_document(doc: &Document, options: &RenderOptions) -> Result<String, FormatError> {
    let body = create_element("div", vec![]);

    if options.include_cover {
        if let Some(cover) = &doc.cover_image {
            append(&body, cover_figure(cover));
        }
    }
    if let Some(title) = &options.title {
        let h1 = create_element("h1", vec![]);
        append(&h1, create_text(title));
        append(&body, h1);
    }

    let container = create_element("div", vec![("class", "quire-document")]);
    append_blocks(&container, &doc.blocks);
    append(&body, container);

    let body_html = serialize_children(&body)?;
    let title = html_escape(options.title.as_deref().unwrap_or("Untitled page"));
    let css = include_str!("../../../css/page.css");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="quire">
  <title>{title}</title>
  <style>
{css}
  </style>
</head>
<body>
{body_html}
</body>
</html>"#
    ))
}

fn cover_figure(cover: &CoverImage) -> Handle {
    let style = format!("background-position: center {}%", cover.position);
    let figure = create_element("figure", vec![("class", "cover-image"), ("style", &style)]);
    append(
        &figure,
        create_element("img", vec![("src", &cover.url), ("alt", "")]),
    );
    figure
}

/// Append rendered blocks to `parent`, grouping consecutive list items of the
/// same kind into one list element.
fn append_blocks(parent: &Handle, blocks: &[Block]) {
    let mut open_list: Option<(bool, Handle)> = None;

    for block in blocks {
        if let BlockKind::ListItem { ordered, content } = &block.kind {
            let list = match open_list.take() {
                Some((list_ordered, list)) if list_ordered == *ordered => list,
                _ => {
                    let list = create_element(if *ordered { "ol" } else { "ul" }, vec![]);
                    append(parent, list.clone());
                    list
                }
            };
            open_list = Some((*ordered, list.clone()));
            let li = create_element("li", vec![]);
            append_inline(&li, content);
            append_blocks(&li, &block.children);
            append(&list, li);
            continue;
        }

        open_list = None;
        append(parent, render_block(block));
        if !block.children.is_empty() {
            let nested = create_element("div", vec![("class", "block-children")]);
            append_blocks(&nested, &block.children);
            append(parent, nested);
        }
    }
}

fn render_block(block: &Block) -> Handle {
    match &block.kind {
        BlockKind::Paragraph { content } => {
            let p = create_element("p", vec![]);
            append_inline(&p, content);
            p
        }
        BlockKind::Heading {
            level,
            background_color,
            content,
        } => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            let color = background_color.map(|token| token.as_str());
            let attrs = color
                .map(|color| vec![("data-background-color", color)])
                .unwrap_or_default();
            let heading = create_element(&tag, attrs);
            append_inline(&heading, content);
            heading
        }
        BlockKind::CodeBlock { language, code } => {
            let class = format!("language-{language}");
            let pre = create_element("pre", vec![]);
            let code_el = create_element("code", vec![("class", &class)]);
            append(&code_el, create_text(code));
            append(&pre, code_el);
            pre
        }
        BlockKind::Terminal { title, code } => {
            let wrapper = create_element("div", vec![("class", "terminal-block")]);
            let title_el = create_element("span", vec![("class", "terminal-title")]);
            append(&title_el, create_text(title));
            append(&wrapper, title_el);
            let pre = create_element("pre", vec![]);
            let code_el = create_element("code", vec![]);
            append(&code_el, create_text(code));
            append(&pre, code_el);
            append(&wrapper, pre);
            wrapper
        }
        BlockKind::Callout { emoji, content } => {
            let wrapper = create_element("div", vec![("class", "callout")]);
            let emoji_el = create_element("span", vec![("class", "callout-emoji")]);
            append(&emoji_el, create_text(emoji));
            append(&wrapper, emoji_el);
            let text_el = create_element("span", vec![("class", "callout-text")]);
            append_inline(&text_el, content);
            append(&wrapper, text_el);
            wrapper
        }
        BlockKind::Divider => create_element("hr", vec![("class", "divider")]),
        BlockKind::Video { url, caption } => {
            let wrapper = create_element("div", vec![("class", "video-embed")]);
            append(
                &wrapper,
                create_element("video", vec![("src", url), ("controls", "")]),
            );
            if !caption.is_empty() {
                let caption_el = create_element("p", vec![("class", "video-caption")]);
                append(&caption_el, create_text(caption));
                append(&wrapper, caption_el);
            }
            wrapper
        }
        BlockKind::ListItem { .. } => {
            // grouped by append_blocks; a stray item still renders
            let li = create_element("li", vec![]);
            append_inline(&li, block.kind.inline_content().unwrap_or_default());
            li
        }
        BlockKind::Image { url, caption } => {
            create_element("img", vec![("src", url), ("alt", caption)])
        }
        BlockKind::Table { rows } => {
            let table = create_element("table", vec![]);
            let tbody = create_element("tbody", vec![]);
            for row in rows {
                let tr = create_element("tr", vec![]);
                for cell in row {
                    let td = create_element("td", vec![]);
                    append_inline(&td, cell);
                    append(&tr, td);
                }
                append(&tbody, tr);
            }
            append(&table, tbody);
            table
        }
        BlockKind::Other { kind, .. } => create_element("div", vec![("data-block-type", kind)]),
    }
}

fn append_inline(parent: &Handle, content: &[InlineContent]) {
    for inline in content {
        match inline {
            InlineContent::Text(span) => append(parent, render_span(span)),
            InlineContent::Link(link) => {
                let anchor = create_element("a", vec![("href", &link.href)]);
                for span in &link.content {
                    append(&anchor, render_span(span));
                }
                append(parent, anchor);
            }
        }
    }
}

/// Wrap a span's text in one element per active style, outermost first.
fn render_span(span: &TextSpan) -> Handle {
    let mut node = create_text(&span.text);

    for (style, tag) in [
        ("code", "code"),
        ("strike", "s"),
        ("underline", "u"),
        ("italic", "em"),
        ("bold", "strong"),
    ] {
        if span.styles.get(style) == Some(&Value::Bool(true)) {
            let wrapper = create_element(tag, vec![]);
            append(&wrapper, node);
            node = wrapper;
        }
    }

    let mut attrs = Vec::new();
    for (style, attr) in [
        ("textColor", "data-text-color"),
        ("backgroundColor", "data-background-color"),
    ] {
        if let Some(Value::String(color)) = span.styles.get(style) {
            attrs.push((attr, color.as_str()));
        }
    }
    if attrs.is_empty() {
        return node;
    }

    let colored = create_element("span", attrs);
    append(&colored, node);
    colored
}

fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of a container node (the container itself is not emitted)
fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
