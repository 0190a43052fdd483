//! Property tests for the total functions of the pipeline

use proptest::prelude::*;
use quire_babel::common::color::map_color;
use quire_babel::common::entities::decode_html_entities;
use quire_babel::formats::html::document::HeadingColors;
use quire_babel::ir::nodes::{Block, BlockKind, ColorToken, InlineContent};
use quire_babel::migrate::{migrate_html, reclassify};

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        (1u8..=3, "[A-Za-z ]{1,20}")
            .prop_map(|(level, text)| Block::heading(level, vec![InlineContent::text(text)])),
        "[a-z]{1,8}( [a-z]{1,8}){2,5}\\.".prop_map(Block::text_paragraph),
        Just(Block::spacer()),
        Just(Block::divider()),
    ]
}

fn colors_strategy() -> impl Strategy<Value = HeadingColors> {
    prop::collection::btree_map(1u8..=3, "#[0-9a-f]{6}", 0..3)
}

proptest! {
    #[test]
    fn map_color_is_total(css in ".*") {
        let token = map_color(&css);
        prop_assert!(ColorToken::ALL.contains(&token));
    }

    #[test]
    fn map_color_handles_every_hex(css in "#[0-9a-fA-F]{6}") {
        let token = map_color(&css);
        prop_assert!(ColorToken::ALL.contains(&token));
        prop_assert_eq!(token, map_color(&css.to_uppercase()));
    }

    #[test]
    fn decoder_leaves_entity_free_text_alone(text in "[^&]*") {
        prop_assert_eq!(decode_html_entities(&text), text.as_str());
    }

    #[test]
    fn migration_never_panics(html in ".{0,200}") {
        let _ = migrate_html(&html);
    }

    #[test]
    fn migration_never_panics_on_tag_soup(
        parts in prop::collection::vec(
            prop_oneof![
                Just("<p>".to_string()),
                Just("</p>".to_string()),
                Just("<div class=\"callout\">".to_string()),
                Just("<div class=\"code-block\">".to_string()),
                Just("</div>".to_string()),
                Just("<pre><code class=\"language-bash\">".to_string()),
                Just("</code></pre>".to_string()),
                Just("<h2>".to_string()),
                Just("</h2>".to_string()),
                Just("&amp;".to_string()),
                "[a-z ]{0,10}",
            ],
            0..30,
        )
    ) {
        let _ = migrate_html(&parts.concat());
    }

    #[test]
    fn every_top_level_heading_follows_a_spacer(
        blocks in prop::collection::vec(block_strategy(), 0..20),
        colors in colors_strategy(),
    ) {
        let out = reclassify(&blocks, &colors);
        for (i, block) in out.iter().enumerate() {
            if matches!(block.kind, BlockKind::Heading { .. }) {
                prop_assert!(i > 0);
                prop_assert!(out[i - 1].is_empty_paragraph());
            }
        }
    }

    #[test]
    fn reclassify_is_idempotent_on_plain_documents(
        blocks in prop::collection::vec(block_strategy(), 0..20),
    ) {
        let colors = HeadingColors::new();
        let once = reclassify(&blocks, &colors);
        let twice = reclassify(&once, &colors);
        prop_assert_eq!(once, twice);
    }
}
