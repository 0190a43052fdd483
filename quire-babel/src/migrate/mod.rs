//! Legacy page migration: raw editor HTML → typed block tree.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. heading colours are scanned from the *original* page's `<style>` block;
//! 2. the body is extracted (page chrome, title and subtitle removed);
//! 3. video embeds are rewritten to marker paragraphs;
//! 4. the generic structural parser builds the baseline block tree;
//! 5. [`reclassify`] rewrites the baseline tree into the editor's block set.
//!
//! Every step is total. Markup that no rule recognises stays a paragraph; the
//! legacy HTML is kept alongside the migrated document for that reason.
//!
//! Reclassification rules, in priority order at each position:
//!
//! 1. a spurious code header paragraph (`JavaScript 12`, `bash`, `3`) right
//!    before a code block (possibly through a second spurious header) is dropped;
//! 2. headings get an empty spacer paragraph before them and a background
//!    colour from the style block;
//! 3. `bash`/`powershell` code blocks become terminals;
//! 4. a paragraph mentioning a terminal followed by a code block merges into one
//!    terminal titled by the paragraph;
//! 5. other non-paragraph blocks pass through;
//! 6. paragraphs are matched against the legacy widget recognisers in
//!    [`widgets`].
//!
//! Input trees are never mutated: the output is rebuilt from borrowed input,
//! so reclassifying the same baseline twice gives the same result.

pub mod widgets;

use crate::common::color::map_color;
use crate::formats::html::document::{
    extract_body, preprocess_embeds, scan_heading_colors, HeadingColors,
};
use crate::formats::html::parser::parse_blocks;
use crate::ir::nodes::{Block, BlockKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Tunables for the widget rules.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrateOptions {
    /// Language of a legacy code block with no `language-*` class.
    pub default_code_language: String,
    /// Emoji for callouts and alerts that do not name one.
    pub default_callout_emoji: String,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        MigrateOptions {
            default_code_language: "javascript".to_string(),
            default_callout_emoji: "💡".to_string(),
        }
    }
}

static SPURIOUS_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z]+(?:\s+\d+)?|\d+)$").expect("valid spurious header regex")
});

/// Migrate a legacy page with the default options.
pub fn migrate_html(html: &str) -> Vec<Block> {
    migrate_html_with(html, &MigrateOptions::default())
}

/// Run the whole migration pipeline over a legacy page.
pub fn migrate_html_with(html: &str, options: &MigrateOptions) -> Vec<Block> {
    let heading_colors = scan_heading_colors(html);
    let body = preprocess_embeds(&extract_body(html));
    let baseline = parse_blocks(&body);
    let blocks = reclassify_with(&baseline, &heading_colors, options);

    info!(
        baseline = baseline.len(),
        migrated = blocks.len(),
        "migrated legacy page"
    );
    blocks
}

/// Reclassify a baseline block list with the default options.
pub fn reclassify(blocks: &[Block], heading_colors: &HeadingColors) -> Vec<Block> {
    reclassify_with(blocks, heading_colors, &MigrateOptions::default())
}

/// Rewrite a baseline block list into the editor's block set.
pub fn reclassify_with(
    blocks: &[Block],
    heading_colors: &HeadingColors,
    options: &MigrateOptions,
) -> Vec<Block> {
    let recurse = |children: &[Block]| reclassify_with(children, heading_colors, options);

    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        let block = &blocks[i];
        let next = blocks.get(i + 1);

        // 1. spurious code header
        if is_spurious_header(block) {
            let before_code = next.map_or(false, is_code_like)
                || (next.map_or(false, is_spurious_header)
                    && blocks.get(i + 2).map_or(false, is_code_like));
            if before_code {
                debug!(text = %block.plain_text().trim(), "dropping spurious code header");
                i += 1;
                continue;
            }
        }

        match &block.kind {
            // 2. heading spacer and colour
            BlockKind::Heading {
                level,
                background_color,
                content,
            } => {
                if !out.last().map_or(false, Block::is_empty_paragraph) {
                    out.push(Block::spacer());
                }
                let background_color = heading_colors
                    .get(level)
                    .map(|css| map_color(css))
                    .or(*background_color);
                out.push(Block {
                    kind: BlockKind::Heading {
                        level: *level,
                        background_color,
                        content: content.clone(),
                    },
                    children: recurse(&block.children),
                    ..block.clone()
                });
            }

            // 3. script-language code
            BlockKind::CodeBlock { language, code } if terminal_title(language).is_some() => {
                let title = terminal_title(language).unwrap_or_default();
                debug!(%language, "code block becomes terminal");
                out.push(Block {
                    kind: BlockKind::Terminal {
                        title: title.to_string(),
                        code: code.clone(),
                    },
                    children: recurse(&block.children),
                    ..block.clone()
                });
            }

            BlockKind::Paragraph { content } => {
                // 4. label + code merge; widget markup is left to rule 6
                let next_code = match next.map(|b| &b.kind) {
                    Some(BlockKind::CodeBlock { code, .. }) if !widgets::holds_markup(content) => {
                        Some(code)
                    }
                    _ => None,
                };
                if let Some(code) = next_code {
                    let label = widgets::visible_text(&block.plain_text());
                    let lowered = label.to_lowercase();
                    if lowered.contains("terminal") || lowered.contains("powershell") {
                        debug!(title = %label.trim(), "merging label into terminal");
                        out.push(Block::terminal(label.trim(), code.clone()));
                        i += 2;
                        continue;
                    }
                }

                // 6. legacy widgets
                match widgets::match_widget(content, options) {
                    Some((rule, replacement)) => {
                        debug!(rule, "legacy widget reclassified");
                        out.push(Block {
                            id: block.id.clone(),
                            children: recurse(&block.children),
                            ..replacement
                        });
                    }
                    None => out.push(Block {
                        children: recurse(&block.children),
                        ..block.clone()
                    }),
                }
            }

            // 5. pass-through
            _ => out.push(Block {
                children: recurse(&block.children),
                ..block.clone()
            }),
        }

        i += 1;
    }

    out
}

/// A paragraph holding only a language name and/or line-number digits.
fn is_spurious_header(block: &Block) -> bool {
    matches!(block.kind, BlockKind::Paragraph { .. })
        && SPURIOUS_HEADER_RE.is_match(block.plain_text().trim())
}

fn is_code_like(block: &Block) -> bool {
    matches!(
        block.kind,
        BlockKind::CodeBlock { .. } | BlockKind::Terminal { .. }
    )
}

fn terminal_title(language: &str) -> Option<&'static str> {
    if language.eq_ignore_ascii_case("powershell") {
        Some("powershell")
    } else if language.eq_ignore_ascii_case("bash") {
        Some("Terminal")
    } else {
        None
    }
}
