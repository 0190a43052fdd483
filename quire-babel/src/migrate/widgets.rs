//! Legacy widget recognisers.
//!
//! Each matcher looks at one inline text span of a baseline paragraph (the
//! span text is the widget's outer HTML, as kept by the structural parser)
//! and either builds the replacement block or declines. [`MATCHERS`] fixes
//! the priority order: the first matcher that accepts a span wins, and later
//! ones are never consulted for that span.
//!
//! Markup is inspected with regular expressions rather than a DOM walk; the
//! widgets were emitted by a single editor and their shape is fixed.

use super::MigrateOptions;
use crate::common::entities::decode_html_entities;
use crate::formats::html::document::VIDEO_EMBED_MARKER;
use crate::ir::nodes::{Block, InlineContent, TextSpan};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// A widget recogniser. Returns the replacement block, or `None` to let the
/// next matcher try.
pub type Matcher = fn(&TextSpan, &MigrateOptions) -> Option<Block>;

/// Matchers in priority order.
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("video", match_video),
    ("divider", match_divider),
    ("terminal-block", match_terminal_block),
    ("code-block", match_code_block),
    ("callout", match_callout),
    ("alert", match_alert),
    ("file-tree", match_file_tree),
    ("diff-block", match_diff_block),
];

/// Emoji for each `data-type` of an alert widget.
pub const ALERT_EMOJIS: &[(&str, &str)] = &[
    ("info", "💡"),
    ("warning", "⚠️"),
    ("error", "🚨"),
    ("success", "✅"),
    ("note", "📌"),
];

const DEFAULT_FILE_TREE_TITLE: &str = "File Structure";
const DIFF_LANGUAGE: &str = "diff";

static CLASS_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code[^>]*>(.*?)</code>").expect("valid code regex"));
static PRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").expect("valid pre regex"));
static LANGUAGE_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\blanguage-([\w+#.-]+)").expect("valid language regex"));
static SCRIPT_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Terminal|powershell)\b").expect("valid keyword regex"));

/// Run the matchers over a paragraph's spans; the first span any matcher
/// accepts decides the replacement.
pub fn match_widget(
    content: &[InlineContent],
    options: &MigrateOptions,
) -> Option<(&'static str, Block)> {
    content.iter().find_map(|inline| match inline {
        InlineContent::Text(span) => MATCHERS
            .iter()
            .find_map(|(name, matcher)| matcher(span, options).map(|block| (*name, block))),
        InlineContent::Link(_) => None,
    })
}

fn match_video(span: &TextSpan, _: &MigrateOptions) -> Option<Block> {
    let url = span.text.trim().strip_prefix(VIDEO_EMBED_MARKER)?;
    Some(Block::video(url.trim(), ""))
}

fn match_divider(span: &TextSpan, _: &MigrateOptions) -> Option<Block> {
    let is_divider = span.text.is_empty()
        && span
            .class_name
            .as_deref()
            .map_or(false, |class| class.contains("divider"));
    is_divider.then(Block::divider)
}

fn match_terminal_block(span: &TextSpan, _: &MigrateOptions) -> Option<Block> {
    marker_position(span, |class| class == "terminal-block")?;
    let title = element_text_by_class(&span.text, "terminal-title").unwrap_or_default();
    let code = code_text(&span.text).unwrap_or_default();
    Some(Block::terminal(title, code))
}

fn match_code_block(span: &TextSpan, options: &MigrateOptions) -> Option<Block> {
    let html = span.text.as_str();
    let marker_at = marker_position(span, |class| class == "code-block")?;
    let code = code_text(html).unwrap_or_default();

    if let Some(lang) = element_text_by_class(html, "code-lang") {
        if lang.eq_ignore_ascii_case("terminal") || lang.eq_ignore_ascii_case("powershell") {
            return Some(Block::terminal(lang, code));
        }
    }

    let before_marker = &html[..marker_at];
    if let Some(keyword) = SCRIPT_KEYWORD_RE.find_iter(before_marker).last() {
        let run = before_marker[..keyword.start()].rsplit('>').next().unwrap_or("");
        let preceding = decode_html_entities(run);
        let preceding = preceding.trim();
        let title = if preceding.is_empty() {
            keyword.as_str().to_string()
        } else {
            preceding.to_string()
        };
        return Some(Block::terminal(title, code));
    }

    let language = LANGUAGE_CLASS_RE
        .captures(html)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| options.default_code_language.clone());
    Some(Block::code_block(language, code))
}

fn match_callout(span: &TextSpan, options: &MigrateOptions) -> Option<Block> {
    let html = span.text.as_str();
    marker_position(span, |class| class == "callout")?;

    let emoji = element_text_by_class(html, "callout-emoji")
        .unwrap_or_else(|| options.default_callout_emoji.clone());
    let text = element_text_by_class(html, "callout-text")
        .or_else(|| element_text_by_class(html, "callout-content"))
        .unwrap_or_default();

    Some(Block::callout(emoji, text_content(text)))
}

fn match_alert(span: &TextSpan, options: &MigrateOptions) -> Option<Block> {
    let html = span.text.as_str();
    let marker_at = marker_position(span, |class| {
        class == "alert" || class.strip_prefix("alert-").map_or(false, |rest| !rest.is_empty())
    })?;

    let data_type = attr_value(&html[marker_at..], "data-type").unwrap_or_default();
    let emoji = ALERT_EMOJIS
        .iter()
        .find(|(kind, _)| kind.eq_ignore_ascii_case(data_type.trim()))
        .map_or(options.default_callout_emoji.as_str(), |(_, emoji)| *emoji);

    Some(Block::callout(emoji, text_content(visible_text(html))))
}

fn match_file_tree(span: &TextSpan, _: &MigrateOptions) -> Option<Block> {
    let html = span.text.as_str();
    marker_position(span, |class| class == "file-tree")?;

    let title = attr_value(html, "data-title")
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_TREE_TITLE.to_string());
    let code = pre_text(html).unwrap_or_default();
    Some(Block::terminal(title, code))
}

fn match_diff_block(span: &TextSpan, _: &MigrateOptions) -> Option<Block> {
    let html = span.text.as_str();
    marker_position(span, |class| class == "diff-block")?;

    let decoded = attr_value(html, "data-content").and_then(|encoded| {
        let bytes = STANDARD.decode(encoded.trim()).ok()?;
        String::from_utf8(bytes).ok()
    });

    let code = match decoded {
        Some(code) => code,
        None => {
            warn!("diff-block without decodable data-content, falling back to <pre>");
            pre_text(html).unwrap_or_default()
        }
    };
    Some(Block::code_block(DIFF_LANGUAGE, code))
}

/// Where a widget's marker class sits in the span markup. A widget kept
/// without markup (an empty element) is matched on the span's own class.
fn marker_position(span: &TextSpan, pred: impl Fn(&str) -> bool) -> Option<usize> {
    class_position(&span.text, &pred).or_else(|| {
        span.class_name
            .as_deref()
            .map_or(false, |classes| classes.split_whitespace().any(&pred))
            .then_some(0)
    })
}

/// Byte offset of the first `class` attribute with a class accepted by `pred`.
fn class_position(html: &str, pred: impl Fn(&str) -> bool) -> Option<usize> {
    CLASS_ATTR_RE.captures_iter(html).find_map(|caps| {
        let value = caps.get(1).or_else(|| caps.get(2))?;
        value
            .as_str()
            .split_whitespace()
            .any(&pred)
            .then(|| caps.get(0).map_or(0, |m| m.start()))
    })
}

/// Decoded text of the first element carrying `class`, tags stripped.
fn element_text_by_class(html: &str, class: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<(span|div|p|strong|em|b)\b[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?{}(?:\s[^"']*)?["'][^>]*>(.*?)</(?:span|div|p|strong|em|b)>"#,
        regex::escape(class)
    );
    let re = Regex::new(&pattern).ok()?;
    let inner = re.captures(html)?.get(2)?.as_str();
    Some(visible_text(inner).trim().to_string())
}

fn attr_value(html: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?i)\b{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(html)?;
    let value = caps.get(1).or_else(|| caps.get(2))?;
    Some(decode_html_entities(value.as_str()).into_owned())
}

fn code_text(html: &str) -> Option<String> {
    let inner = CODE_RE.captures(html)?.get(1)?.as_str();
    Some(visible_text(inner))
}

fn pre_text(html: &str) -> Option<String> {
    let inner = PRE_RE.captures(html)?.get(1)?.as_str();
    Some(visible_text(inner))
}

/// True when the paragraph's first span is a widget kept as markup by the
/// structural parser.
pub(crate) fn holds_markup(content: &[InlineContent]) -> bool {
    match content.first() {
        Some(InlineContent::Text(span)) => {
            span.class_name.is_some() && span.text.trim_start().starts_with('<')
        }
        _ => false,
    }
}

/// Markup stripped of tags, with the supported entities decoded.
pub(crate) fn visible_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    decode_html_entities(&stripped).into_owned()
}

fn text_content(text: String) -> Vec<InlineContent> {
    let text = text.trim();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![InlineContent::text(text)]
    }
}
