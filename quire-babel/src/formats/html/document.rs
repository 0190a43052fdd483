//! Whole-document preprocessing of legacy page HTML.
//!
//! These run on the raw string before any structural parsing:
//!
//! - [`scan_heading_colors`] reads heading background colours from the page's
//!   `<style>` block (document scope, so it must see the unstripped input);
//! - [`extract_body`] drops the page chrome and the title/subtitle, which the
//!   page model already stores separately;
//! - [`preprocess_embeds`] rewrites video embeds into a text marker the
//!   structural parser keeps.
//!
//! All three are total: missing structure yields a documented default.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Prefix of the text marker left in place of a video embed.
pub const VIDEO_EMBED_MARKER: &str = "VIDEO_EMBED:::";

/// Class of the paragraph wrapping a [`VIDEO_EMBED_MARKER`].
pub const VIDEO_EMBED_PLACEHOLDER_CLASS: &str = "VIDEO_EMBED_PLACEHOLDER";

/// Heading level → raw CSS background colour.
pub type HeadingColors = BTreeMap<u8, String>;

static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid body regex"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>.*?</h1>").expect("valid title regex"));
static SUBTITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<p\s+class=["']subtitle["'][^>]*>.*?</p>"#).expect("valid subtitle regex")
});
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("valid style regex"));
static BACKGROUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)background-color\s*:\s*([^;}]+)").expect("valid background regex")
});
static HEADING_RULE_RES: Lazy<Vec<(u8, Regex)>> = Lazy::new(|| {
    (1..=3)
        .map(|level| {
            let pattern = format!(r"(?is)(?:^|[\s,}}>])h{level}\b[^{{}}]*\{{([^}}]*)\}}");
            (level, Regex::new(&pattern).expect("valid heading rule regex"))
        })
        .collect()
});

const EMBED_WRAPPER: &str = r#"<div[^>]*class=["'][^"']*\bvideo-embed\b[^"']*["'][^>]*>\s*"#;

static EMBED_RES: Lazy<[Regex; 3]> = Lazy::new(|| {
    let build = |inner: &str| {
        Regex::new(&format!(r"(?is){EMBED_WRAPPER}{inner}\s*</div>")).expect("valid embed regex")
    };
    [
        build(r#"<iframe[^>]*\ssrc=["']([^"']+)["'][^>]*>.*?</iframe>"#),
        build(r#"<video[^>]*>\s*<source[^>]*\ssrc=["']([^"']+)["'][^>]*>.*?</video>"#),
        build(r#"<video[^>]*\ssrc=["']([^"']+)["'][^>]*>.*?</video>"#),
    ]
});

/// Strip a full legacy page down to its body content.
///
/// Without a `<body>` element the input is treated as a fragment and used
/// whole. The first `<h1>` and the first `<p class="subtitle">` are removed.
pub fn extract_body(full_html: &str) -> String {
    let body = BODY_RE
        .captures(full_html)
        .and_then(|caps| caps.get(1))
        .map_or(full_html, |m| m.as_str());

    let body = TITLE_RE.replacen(body, 1, "");
    let body = SUBTITLE_RE.replacen(&body, 1, "");
    body.trim().to_string()
}

/// Background colours declared for `h1`–`h3` in the first `<style>` block.
pub fn scan_heading_colors(full_html: &str) -> HeadingColors {
    let mut colors = HeadingColors::new();
    let Some(css) = STYLE_RE.captures(full_html).and_then(|caps| caps.get(1)) else {
        return colors;
    };

    for (level, rule_re) in HEADING_RULE_RES.iter() {
        let declaration = rule_re
            .captures(css.as_str())
            .and_then(|rule| rule.get(1))
            .and_then(|body| BACKGROUND_RE.captures(body.as_str()))
            .and_then(|decl| decl.get(1));

        if let Some(value) = declaration {
            let value = value.as_str().replace("!important", "");
            let value = value.trim();
            if !value.is_empty() {
                colors.insert(*level, value.to_string());
            }
        }
    }

    colors
}

/// Replace each `<div class="video-embed">` wrapping an iframe, a
/// `<video><source src>` or a `<video src>` with a marker paragraph.
pub fn preprocess_embeds(body_html: &str) -> String {
    let mut html = body_html.to_string();
    for embed_re in EMBED_RES.iter() {
        html = embed_re
            .replace_all(&html, |caps: &Captures| placeholder(&caps[1]))
            .into_owned();
    }
    html
}

fn placeholder(url: &str) -> String {
    format!(r#"<p class="{VIDEO_EMBED_PLACEHOLDER_CLASS}">{VIDEO_EMBED_MARKER}{url}</p>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_drops_chrome_title_and_subtitle() {
        let html = r#"<html><body><h1>T</h1><p class="subtitle">S</p><p>X</p></body></html>"#;
        assert_eq!(extract_body(html), "<p>X</p>");
    }

    #[test]
    fn fragment_passes_through() {
        assert_eq!(extract_body("  <p>only</p>\n"), "<p>only</p>");
        assert_eq!(extract_body(""), "");
    }

    #[test]
    fn only_first_title_is_removed() {
        let html = "<body><h1>A</h1><h1>B</h1></body>";
        assert_eq!(extract_body(html), "<h1>B</h1>");
    }

    #[test]
    fn heading_colors_from_style_block() {
        let html = r#"<html><head><style>
            body { margin: 0 }
            h1 { color: white; background-color: #e03e2d; }
            h2, h3 { background-color: blue !important }
            .note h4 { background-color: red }
        </style></head><body></body></html>"#;

        let colors = scan_heading_colors(html);
        assert_eq!(colors.get(&1).map(String::as_str), Some("#e03e2d"));
        assert_eq!(colors.get(&2).map(String::as_str), Some("blue"));
        assert_eq!(colors.get(&3).map(String::as_str), Some("blue"));
        assert_eq!(colors.len(), 3);
    }

    #[test]
    fn no_style_block_means_no_colors() {
        assert!(scan_heading_colors("<h1>plain</h1>").is_empty());
        assert!(scan_heading_colors("<style>h1 { color: red }</style>").is_empty());
    }

    #[test]
    fn embeds_become_markers() {
        let iframe = r#"<div class="video-embed"><iframe src="https://player.example/1" allowfullscreen></iframe></div>"#;
        let source = r#"<div class="video-embed">
            <video controls><source src="/media/a.mp4" type="video/mp4"></video>
        </div>"#;
        let direct = r#"<div class="video-embed"><video src="/media/b.mp4" controls></video></div>"#;

        assert_eq!(
            preprocess_embeds(iframe),
            r#"<p class="VIDEO_EMBED_PLACEHOLDER">VIDEO_EMBED:::https://player.example/1</p>"#
        );
        assert_eq!(
            preprocess_embeds(source),
            r#"<p class="VIDEO_EMBED_PLACEHOLDER">VIDEO_EMBED:::/media/a.mp4</p>"#
        );
        assert_eq!(
            preprocess_embeds(direct),
            r#"<p class="VIDEO_EMBED_PLACEHOLDER">VIDEO_EMBED:::/media/b.mp4</p>"#
        );
    }

    #[test]
    fn unrelated_markup_is_untouched() {
        let html = r#"<div class="callout"><video src="x"></video></div>"#;
        assert_eq!(preprocess_embeds(html), html);
    }
}
