//! Minimal HTML entity decoding.
//!
//! Only the five entities the legacy editor ever emitted inside widget markup
//! are decoded. Anything else that looks like an entity (`&nbsp;`, `&#x27;`,
//! ...) is left as written; callers must not treat this as a general decoder.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[^;]+;").expect("valid entity regex"));

fn lookup(entity: &str) -> Option<&'static str> {
    match entity {
        "&lt;" => Some("<"),
        "&gt;" => Some(">"),
        "&amp;" => Some("&"),
        "&quot;" => Some("\""),
        "&#39;" => Some("'"),
        _ => None,
    }
}

/// Decode `&lt; &gt; &amp; &quot; &#39;`, leaving every other entity intact.
pub fn decode_html_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |caps: &Captures| {
        let entity = &caps[0];
        lookup(entity).unwrap_or(entity).to_string()
    })
}
