use proptest::prelude::*;
use pz_translate::{ParseOptions, Parser, ResourceFile, TagCodec, Template, render::distribute};
use std::collections::BTreeMap;

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("Sandbox_[A-Za-z0-9_]{1,12}").expect("valid key regex")
}

/// Text as it appears between the quotes of a string literal: plain
/// characters and backslash escapes.
fn fragment_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r#"([A-Za-z0-9 ,!?$%<>{}]|\\[n\\"]){0,12}"#)
        .expect("valid fragment regex")
}

fn unpaired_backslash_at_end(piece: &str) -> bool {
    piece.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn entries_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
    prop::collection::btree_map(
        key_strategy(),
        prop::collection::vec(fragment_strategy(), 1..4),
        1..10,
    )
}

fn render_source(entries: &BTreeMap<String, Vec<String>>, comments: bool) -> String {
    let mut out = String::from("Sandbox_EN = {\n");
    for (index, (key, fragments)) in entries.iter().enumerate() {
        if comments && index % 3 == 1 {
            out.push_str("    -- section\n\n");
        }
        out.push_str(&format!("    {} = \"{}\"", key, fragments[0]));
        for fragment in &fragments[1..] {
            out.push_str(&format!(" ..\n        \"{}\"", fragment));
        }
        out.push_str(",\n");
    }
    out.push_str("}\n");
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_render_reproduces_source(entries in entries_strategy(), comments in any::<bool>()) {
        let text = render_source(&entries, comments);
        let file = ResourceFile::parse(&text, &ParseOptions::source("EN")).unwrap();
        prop_assert_eq!(file.render(), Some(text));
    }

    #[test]
    fn prop_entries_hold_joined_fragments(entries in entries_strategy()) {
        let text = render_source(&entries, false);
        let file = ResourceFile::parse(&text, &ParseOptions::source("EN")).unwrap();
        for (key, fragments) in &entries {
            let joined = fragments.concat();
            prop_assert_eq!(file.entries.get(key), Some(joined.as_str()));
        }
        prop_assert_eq!(file.entries.entry_count(), entries.len());
    }

    #[test]
    fn prop_template_text_form_parses_back(entries in entries_strategy()) {
        let text = render_source(&entries, true);
        let file = ResourceFile::parse(&text, &ParseOptions::source("EN")).unwrap();
        let template = file.template.unwrap();
        let reparsed: Template = template.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, template);
    }

    #[test]
    fn prop_unmask_restores_masked_text(text in "[A-Za-z0-9 ,.<>%{}]{0,40}") {
        let codec = TagCodec::default();
        prop_assert_eq!(codec.unmask(&codec.mask(&text)), text);
    }

    #[test]
    fn prop_masked_text_has_no_bare_tags(text in "[A-Za-z0-9 <>%{}]{0,40}") {
        let masked = TagCodec::default().mask(&text);
        let without_surrogates = masked
            .replace("{<{", "")
            .replace("}>}", "")
            .replace("{%1}", "")
            .replace("{%2}", "")
            .replace("{%3}", "");
        prop_assert!(!without_surrogates.contains('<'));
        prop_assert!(!without_surrogates.contains('>'));
    }

    #[test]
    fn prop_distribute_keeps_escapes_in_one_piece(
        value in fragment_strategy(),
        widths in prop::collection::vec(0usize..8, 1..5),
        exact in any::<bool>(),
    ) {
        // Exact mode gives the parts the value's own length, as for a
        // translation that happens to be as long as its source.
        let widths = if exact {
            let len = value.chars().count();
            let n = widths.len();
            let mut exact_widths = vec![len / n; n];
            exact_widths[n - 1] += len % n;
            exact_widths
        } else {
            widths
        };
        let pieces = distribute(&value, &widths);
        prop_assert_eq!(pieces.len(), widths.len());
        prop_assert_eq!(pieces.concat(), value.clone());
        for piece in &pieces[..pieces.len() - 1] {
            prop_assert!(!unpaired_backslash_at_end(piece), "piece {:?} of {:?}", piece, value);
        }
    }
}
