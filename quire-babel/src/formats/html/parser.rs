//! Generic HTML → baseline block tree parser.
//!
//! This is the structural pass that runs before reclassification. It knows
//! ordinary HTML (paragraphs, headings, code, lists, tables, images) and
//! nothing about the legacy editor's widgets beyond their class names: a
//! `<div>` whose class names a widget, or a classed `<div>` with no block
//! content of its own, is kept opaque as a paragraph whose single span holds
//! the element's outer HTML and whose `class_name` is the element's class.
//! The migration rules then recognise widgets from that markup. Any other
//! classed `<div>` is a layout wrapper and is parsed through.
//!
//! Parsing uses html5ever's browser-grade tree builder, so any input string
//! produces a tree and the parser never fails.

use crate::common::color::map_color;
use crate::ir::nodes::{Block, BlockKind, InlineContent, Link, Props, TextSpan};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Elements whose children are parsed as if they were siblings of the element.
const TRANSPARENT_TAGS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "figure", "center", "form",
];

/// Class names the legacy editor put on its widget roots. `alert-*` and any
/// class mentioning `divider` are matched separately in [`is_widget_class`].
const WIDGET_CLASSES: &[&str] = &[
    "terminal-block",
    "code-block",
    "callout",
    "alert",
    "file-tree",
    "diff-block",
    "video-embed",
];

/// Elements dropped with their whole subtree.
const IGNORED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript", "title"];

/// Elements that belong to a paragraph's inline flow.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "font",
    "i", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong",
    "sub", "sup", "time", "u", "var", "wbr",
];

static STYLE_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*(background-color|color)\s*:\s*([^;]+)").expect("valid style regex")
});

/// Parse body HTML into the baseline block tree.
pub fn parse_blocks(body_html: &str) -> Vec<Block> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(body_html);
    let mut blocks = Vec::new();
    collect_blocks(&dom.document, &mut blocks);
    blocks
}

fn collect_blocks(parent: &Handle, out: &mut Vec<Block>) {
    let mut pending: Vec<InlineContent> = Vec::new();

    for child in parent.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                push_text(&mut pending, &contents.borrow(), &Props::new());
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if INLINE_TAGS.contains(&tag) {
                    collect_inline(child, &Props::new(), &mut pending);
                    continue;
                }
                flush_paragraph(&mut pending, out);
                collect_block_element(child, tag, out);
            }
            _ => {}
        }
    }

    flush_paragraph(&mut pending, out);
}

fn collect_block_element(node: &Handle, tag: &str, out: &mut Vec<Block>) {
    if IGNORED_TAGS.contains(&tag) {
        return;
    }

    let class = attr(node, "class").filter(|class| !class.trim().is_empty());

    match tag {
        "div" if class.as_deref().map_or(false, |class| is_opaque_div(node, class)) => {
            out.push(opaque_widget(node, class))
        }
        _ if TRANSPARENT_TAGS.contains(&tag) => collect_blocks(node, out),
        "p" => out.push(Block::paragraph(with_class(inline_of(node), class))),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(1).min(3);
            out.push(Block::heading(level, inline_of(node)));
        }
        "pre" => out.push(code_block(node)),
        "ul" | "ol" => out.extend(list_items(node, tag == "ol")),
        "table" => out.push(table(node)),
        "img" => out.push(Block::new(BlockKind::Image {
            url: attr(node, "src").unwrap_or_default(),
            caption: attr(node, "alt").unwrap_or_default(),
        })),
        "hr" => out.push(Block::paragraph(with_class(Vec::new(), class))),
        _ => {
            // Unknown block-level markup degrades to a paragraph of its text.
            let content = inline_of(node);
            if !content.is_empty() {
                out.push(Block::paragraph(content));
            }
        }
    }
}

fn flush_paragraph(pending: &mut Vec<InlineContent>, out: &mut Vec<Block>) {
    let content = normalize_inline(std::mem::take(pending));
    if !content.is_empty() {
        out.push(Block::paragraph(content));
    }
}

/// A classed `<div>` is opaque when its class names a widget, or when it
/// holds nothing but inline content and images (an unknown widget).
fn is_opaque_div(node: &Handle, class: &str) -> bool {
    class.split_whitespace().any(is_widget_class) || !has_block_children(node)
}

fn is_widget_class(class: &str) -> bool {
    WIDGET_CLASSES.contains(&class)
        || class.strip_prefix("alert-").map_or(false, |rest| !rest.is_empty())
        || class.contains("divider")
}

fn has_block_children(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| match tag_name(child) {
        Some(tag) => !INLINE_TAGS.contains(&tag) && !IGNORED_TAGS.contains(&tag) && tag != "img",
        None => false,
    })
}

/// A classed `<div>` kept as markup for the widget rules. A bare marker
/// element (no content, no attributes but `class`) keeps only its class.
fn opaque_widget(node: &Handle, class: Option<String>) -> Block {
    let text = if is_blank(node) && attr_count(node) <= 1 {
        String::new()
    } else {
        outer_html(node)
    };
    Block::paragraph(vec![InlineContent::Text(TextSpan {
        text,
        styles: Props::new(),
        class_name: class,
    })])
}

/// Attach an element's class to its first span, creating an empty span if
/// the element had no content.
fn with_class(mut content: Vec<InlineContent>, class: Option<String>) -> Vec<InlineContent> {
    let Some(class) = class else {
        return content;
    };
    match content.first_mut() {
        Some(InlineContent::Text(span)) => span.class_name = Some(class),
        Some(InlineContent::Link(_)) => {}
        None => content.push(InlineContent::Text(TextSpan {
            class_name: Some(class),
            ..Default::default()
        })),
    }
    content
}

fn code_block(pre: &Handle) -> Block {
    let code_child = pre.children.borrow().iter().find(|c| tag_name(c) == Some("code")).cloned();

    let language = [Some(pre.clone()), code_child]
        .iter()
        .flatten()
        .filter_map(|node| attr(node, "class"))
        .find_map(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-").map(str::to_string))
        })
        .unwrap_or_else(|| "text".to_string());

    Block::code_block(language, text_content(pre))
}

fn list_items(list: &Handle, ordered: bool) -> Vec<Block> {
    list.children
        .borrow()
        .iter()
        .filter(|child| tag_name(child) == Some("li"))
        .map(|li| {
            let mut content = Vec::new();
            let mut children = Vec::new();
            for part in li.children.borrow().iter() {
                match tag_name(part) {
                    Some(nested @ ("ul" | "ol")) => {
                        children.extend(list_items(part, nested == "ol"));
                    }
                    _ => collect_inline(part, &Props::new(), &mut content),
                }
            }
            Block::new(BlockKind::ListItem {
                ordered,
                content: normalize_inline(content),
            })
            .with_children(children)
        })
        .collect()
}

fn table(node: &Handle) -> Block {
    let mut rows = Vec::new();
    collect_rows(node, &mut rows);
    Block::new(BlockKind::Table { rows })
}

fn collect_rows(node: &Handle, rows: &mut Vec<Vec<Vec<InlineContent>>>) {
    for child in node.children.borrow().iter() {
        match tag_name(child) {
            Some("thead" | "tbody" | "tfoot") => collect_rows(child, rows),
            Some("tr") => {
                let cells = child
                    .children
                    .borrow()
                    .iter()
                    .filter(|cell| matches!(tag_name(cell), Some("td" | "th")))
                    .map(inline_of)
                    .collect();
                rows.push(cells);
            }
            _ => {}
        }
    }
}

/// All inline content below `node`, whitespace-normalized.
fn inline_of(node: &Handle) -> Vec<InlineContent> {
    let mut content = Vec::new();
    for child in node.children.borrow().iter() {
        collect_inline(child, &Props::new(), &mut content);
    }
    normalize_inline(content)
}

fn collect_inline(node: &Handle, styles: &Props, out: &mut Vec<InlineContent>) {
    match &node.data {
        NodeData::Text { contents } => push_text(out, &contents.borrow(), styles),
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            if IGNORED_TAGS.contains(&tag) {
                return;
            }

            let mut styles = styles.clone();
            match tag {
                "br" => {
                    push_raw(out, "\n", &styles);
                    return;
                }
                "img" | "ul" | "ol" => return,
                "strong" | "b" => set_style(&mut styles, "bold"),
                "em" | "i" => set_style(&mut styles, "italic"),
                "u" | "ins" => set_style(&mut styles, "underline"),
                "s" | "strike" | "del" => set_style(&mut styles, "strike"),
                "code" | "kbd" | "samp" => set_style(&mut styles, "code"),
                "a" => {
                    let mut inner = Vec::new();
                    for child in node.children.borrow().iter() {
                        collect_inline(child, &styles, &mut inner);
                    }
                    let content = inner
                        .into_iter()
                        .flat_map(|inline| match inline {
                            InlineContent::Text(span) => vec![span],
                            InlineContent::Link(link) => link.content,
                        })
                        .collect();
                    out.push(InlineContent::Link(Link {
                        href: attr(node, "href").unwrap_or_default(),
                        content,
                    }));
                    return;
                }
                _ => {}
            }

            if let Some(style) = attr(node, "style") {
                apply_color_styles(&style, &mut styles);
            }

            for child in node.children.borrow().iter() {
                collect_inline(child, &styles, out);
            }
        }
        _ => {}
    }
}

fn set_style(styles: &mut Props, name: &str) {
    styles.insert(name.to_string(), Value::Bool(true));
}

/// Inline `color` / `background-color` declarations become colour tokens.
fn apply_color_styles(style: &str, styles: &mut Props) {
    for caps in STYLE_COLOR_RE.captures_iter(style) {
        let key = if caps[1].eq_ignore_ascii_case("color") {
            "textColor"
        } else {
            "backgroundColor"
        };
        let token = map_color(&caps[2]);
        styles.insert(key.to_string(), Value::String(token.as_str().to_string()));
    }
}

/// Push a raw text node, collapsing whitespace runs the way a browser would.
fn push_text(out: &mut Vec<InlineContent>, raw: &str, styles: &Props) {
    let mut collapsed = String::with_capacity(raw.len());
    let mut in_space = ends_with_space(out);
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }
    push_raw(out, &collapsed, styles);
}

fn push_raw(out: &mut Vec<InlineContent>, text: &str, styles: &Props) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineContent::Text(last)) = out.last_mut() {
        if &last.styles == styles && last.class_name.is_none() {
            last.text.push_str(text);
            return;
        }
    }
    out.push(InlineContent::Text(TextSpan {
        text: text.to_string(),
        styles: styles.clone(),
        class_name: None,
    }));
}

/// True at the start of a paragraph or after whitespace.
fn ends_with_space(out: &[InlineContent]) -> bool {
    let last_text = match out.last() {
        None => return true,
        Some(InlineContent::Text(span)) => span.text.as_str(),
        Some(InlineContent::Link(link)) => link.content.last().map_or("", |s| s.text.as_str()),
    };
    last_text.chars().last().map_or(false, char::is_whitespace)
}

/// Trim the edges of a run of inline content and drop empty spans.
fn normalize_inline(mut content: Vec<InlineContent>) -> Vec<InlineContent> {
    if let Some(InlineContent::Text(first)) = content.first_mut() {
        first.text = first.text.trim_start_matches(' ').to_string();
    }
    if let Some(InlineContent::Text(last)) = content.last_mut() {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
    content.retain(|inline| match inline {
        InlineContent::Text(span) => !span.text.is_empty() || span.class_name.is_some(),
        InlineContent::Link(_) => true,
    });
    content
}

fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref() == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Concatenated descendant text, whitespace preserved.
fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    append_text(node, &mut text);
    text
}

fn append_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                append_text(child, out);
            }
        }
    }
}

fn attr_count(node: &Handle) -> usize {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().len(),
        _ => 0,
    }
}

/// No element children and nothing but whitespace as text.
fn is_blank(node: &Handle) -> bool {
    node.children.borrow().iter().all(|child| match &child.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        NodeData::Comment { .. } => true,
        _ => false,
    })
}

fn outer_html(node: &Handle) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    match serialize(&mut bytes, &serializable, opts) {
        Ok(()) => String::from_utf8(bytes).unwrap_or_else(|_| text_content(node)),
        Err(_) => text_content(node),
    }
}
