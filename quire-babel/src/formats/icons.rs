//! Icon mapping for tree visualization
//!
//! Keyed by the wire `type` of a block, so blocks passed through from the
//! editor with unknown types still get the fallback icon.

/// Get the Unicode icon for a given block type
pub fn get_icon(block_type: &str) -> &'static str {
    match block_type {
        "document" => "⧉",
        "paragraph" => "¶",
        "heading" => "§",
        "codeBlock" => "𝒱",
        "terminal" => "$",
        "callout" => "✱",
        "divider" => "⎯",
        "video" => "▶",
        "bulletListItem" => "•",
        "numberedListItem" => "#",
        "image" => "▣",
        "table" => "▦",
        "cover" => "◩",
        _ => "○",
    }
}
