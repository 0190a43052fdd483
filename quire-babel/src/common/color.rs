//! CSS colour → editor colour token mapping.
//!
//! The legacy editor let authors pick arbitrary CSS colours; the block editor
//! only knows ten named tokens. [`map_color`] is total: every input resolves to
//! exactly one token, and anything it cannot place lands on
//! [`ColorToken::Gray`].
//!
//! Resolution order:
//!
//! 1. exact lookup (after lowercasing and trimming) in [`NAMED_COLORS`], which
//!    holds the named colours and the legacy palette's hex literals;
//! 2. for a `#rrggbb` value, the channel heuristics in [`classify_rgb`];
//! 3. fallback to gray.

use crate::ir::nodes::ColorToken;

/// Exact matches: colour names and the hex values of the legacy palette.
pub const NAMED_COLORS: &[(&str, ColorToken)] = &[
    ("red", ColorToken::Red),
    ("orange", ColorToken::Orange),
    ("yellow", ColorToken::Yellow),
    ("green", ColorToken::Green),
    ("blue", ColorToken::Blue),
    ("purple", ColorToken::Purple),
    ("pink", ColorToken::Pink),
    ("gray", ColorToken::Gray),
    ("grey", ColorToken::Gray),
    ("brown", ColorToken::Brown),
    // legacy palette
    ("#e03e2d", ColorToken::Red),
    ("#c0392b", ColorToken::Red),
    ("#e67e23", ColorToken::Orange),
    ("#f39c12", ColorToken::Orange),
    ("#f1c40f", ColorToken::Yellow),
    ("#fbeeb8", ColorToken::Yellow),
    ("#2dc26b", ColorToken::Green),
    ("#27ae60", ColorToken::Green),
    ("#3598db", ColorToken::Blue),
    ("#236fa1", ColorToken::Blue),
    ("#b96ad9", ColorToken::Purple),
    ("#843fa1", ColorToken::Purple),
    ("#e91e63", ColorToken::Pink),
    ("#f8cac6", ColorToken::Pink),
    ("#95a5a6", ColorToken::Gray),
    ("#7e8c8d", ColorToken::Gray),
    ("#8b4513", ColorToken::Brown),
];

/// Map any CSS colour string to one of the ten editor tokens.
pub fn map_color(css_color: &str) -> ColorToken {
    let normalized = css_color.trim().to_lowercase();

    if let Some((_, token)) = NAMED_COLORS.iter().find(|(name, _)| *name == normalized) {
        return *token;
    }

    match parse_hex(&normalized) {
        Some((r, g, b)) => classify_rgb(r, g, b),
        None => ColorToken::Gray,
    }
}

/// Parse `#rrggbb`. Short (`#rgb`) and alpha forms are not recognised.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Ordered channel heuristics; the first rule that holds wins.
///
/// A channel only "dominates" when it clears both others by a margin, so
/// mixed hues (pink, orange, yellow, purple) fall through to their dedicated
/// ranges instead of being swallowed by red or blue.
pub fn classify_rgb(r: u8, g: u8, b: u8) -> ColorToken {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));

    if r > g + 40 && r > b + 40 && (g - b).abs() < 50 {
        ColorToken::Red
    } else if g > r + 30 && g > b + 30 {
        ColorToken::Green
    } else if (100..200).contains(&r) && g < 100 && b > 100 {
        ColorToken::Purple
    } else if b > r + 40 && b > g + 30 {
        ColorToken::Blue
    } else if r > 200 && g > 180 && b < 130 {
        ColorToken::Yellow
    } else if r > 200 && g < 180 && b > 130 {
        ColorToken::Pink
    } else if r > 200 && (100..200).contains(&g) && b < 100 {
        ColorToken::Orange
    } else {
        // low-variance greys and anything left unplaced
        ColorToken::Gray
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_and_space_insensitive() {
        assert_eq!(map_color("  RED "), ColorToken::Red);
        assert_eq!(map_color("Grey"), ColorToken::Gray);
        assert_eq!(map_color("brown"), ColorToken::Brown);
    }

    #[test]
    fn palette_literals_win_over_heuristics() {
        // #8b4513 would fall through to gray by channels alone
        assert_eq!(map_color("#8B4513"), ColorToken::Brown);
        assert_eq!(map_color("#fbeeb8"), ColorToken::Yellow);
    }

    #[test]
    fn hex_heuristics() {
        assert_eq!(map_color("#ff0000"), ColorToken::Red);
        assert_eq!(map_color("#32cd32"), ColorToken::Green);
        assert_eq!(map_color("#1e90ff"), ColorToken::Blue);
        assert_eq!(map_color("#8a2be2"), ColorToken::Purple);
        assert_eq!(map_color("#800080"), ColorToken::Purple);
        assert_eq!(map_color("#ffd700"), ColorToken::Yellow);
        assert_eq!(map_color("#ff69b4"), ColorToken::Pink);
        assert_eq!(map_color("#ffa500"), ColorToken::Orange);
        assert_eq!(map_color("#cccccc"), ColorToken::Gray);
    }

    #[test]
    fn unparseable_input_falls_back_to_gray() {
        assert_eq!(map_color(""), ColorToken::Gray);
        assert_eq!(map_color("rgb(255, 0, 0)"), ColorToken::Gray);
        assert_eq!(map_color("#fff"), ColorToken::Gray);
        assert_eq!(map_color("#gggggg"), ColorToken::Gray);
        assert_eq!(map_color("default"), ColorToken::Gray);
    }

    #[test]
    fn tokens_map_to_themselves() {
        for token in ColorToken::ALL {
            if token != ColorToken::Default {
                assert_eq!(map_color(token.as_str()), token);
            }
        }
    }
}
