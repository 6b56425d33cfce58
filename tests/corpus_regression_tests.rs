use indoc::indoc;
use pz_translate::{
    ParseOptions, Parser, ResourceFile, ScanEvent, Scanner, Template, TranslationMap, render,
};

fn parse(text: &str) -> ResourceFile {
    ResourceFile::parse(text, &ParseOptions::source("EN")).unwrap()
}

#[test]
fn test_continuation_joins_fragments() {
    let text = "UI_EN = {\n    Key = \"Hello \".. \n        \"world\"\n}\n";
    let file = parse(text);
    assert_eq!(file.entries.get("Key"), Some("Hello world"));
    assert!(file.warnings.is_empty());
    assert_eq!(file.render().as_deref(), Some(text));
}

#[test]
fn test_broken_concatenation_warns_once() {
    let text = indoc! {r#"
        UI_EN = {
            KeyA = "foo"..
            KeyB = "bar"
        }
    "#};
    let file = parse(text);
    assert_eq!(file.entries.get("KeyA"), Some("foo"));
    assert_eq!(file.entries.get("KeyB"), Some("bar"));
    let about_a: Vec<&String> = file
        .warnings
        .messages()
        .iter()
        .filter(|message| message.contains("KeyA"))
        .collect();
    assert_eq!(about_a, vec!["Concat interrupted for KeyA"]);
    assert_eq!(file.warnings.count(), 1);
    assert_eq!(file.render().as_deref(), Some(text));
}

#[test]
fn test_missing_value_keeps_placeholder_syntax() {
    let file = parse("UI_EN = {\n    UI_Yes = \"Yes\",\n    UI_No = \"No\",\n}\n");
    let mut map = TranslationMap::for_language("FR");
    map.insert("UI_Yes", "Oui");
    assert_eq!(
        file.render_with(&map).as_deref(),
        Some("UI_FR = {\n    UI_Yes = \"Oui\",\n    UI_No = \"${UI_No}\",\n}\n")
    );
}

#[test]
fn test_game_file_with_comments_and_odd_lines() {
    let text = indoc! {r#"
        Sandbox_EN = {
            -- Options = "not an assignment",
            Sandbox_Speed = "Speed", -- trailing "comment"
            Sandbox_Quote = "The "real" deal",

            = "no key",
            Sandbox_Lore = "It was ".. -- comment after operator
                "a dark "..
                "night",
            Sandbox_Url = "see http://a.b/c",
        }
    "#};
    let file = parse(text);
    assert_eq!(file.render().as_deref(), Some(text));
    assert_eq!(file.entries.get("Sandbox_Quote"), Some("The \"real\" deal"));
    assert_eq!(file.entries.get("Sandbox_Lore"), Some("It was a dark night"));
    assert_eq!(file.entries.get("Sandbox_Url"), Some("see http://a.b/c"));
    assert!(!file.entries.contains_key("Options"));
    assert_eq!(file.warnings.messages(), ["No key in: = \"no key\","]);
}

#[test]
fn test_last_quote_closes_the_text() {
    let file = parse("UI_EN = {\n    UI_A = \"x\", -- \"y\"\n}\n");
    assert_eq!(file.entries.get("UI_A"), Some("x\", -- \"y"));
}

#[test]
fn test_comment_ends_continuation_but_keeps_fragment() {
    let text = indoc! {r#"
        UI_EN = {
            UI_A = "one "..
                "two".. -- stop here
                "three",
        }
    "#};
    let file = parse(text);
    assert_eq!(file.entries.get("UI_A"), Some("one two"));
    assert_eq!(file.render().as_deref(), Some(text));
}

#[test]
fn test_blank_line_ends_continuation() {
    let text = "UI_EN = {\n    UI_A = \"one\"..\n\n    UI_B = \"two\",\n}\n";
    let file = parse(text);
    assert_eq!(file.entries.get("UI_A"), Some("one"));
    assert_eq!(file.entries.get("UI_B"), Some("two"));
    assert!(file.warnings.is_empty());
    assert_eq!(file.render().as_deref(), Some(text));
}

#[test]
fn test_unterminated_continuation_at_end_of_file() {
    let events = Scanner::scan(&ParseOptions::source("EN"), "UI_A = \"one\"..\n");
    assert!(matches!(events.as_slice(), [
        ScanEvent::Warning(message),
        ScanEvent::Assignment(assignment),
    ] if message == "Concat interrupted for UI_A" && assignment.text == "one"));
}

#[test]
fn test_duplicate_keys_render_last_text() {
    let text = "UI_EN = {\n    UI_A = \"first\",\n    UI_A = \"second\",\n}\n";
    let file = parse(text);
    assert_eq!(file.warnings.messages(), ["Duplicate key: UI_A"]);
    assert_eq!(file.entries.get("UI_A"), Some("second"));
    assert_eq!(
        file.render().as_deref(),
        Some("UI_EN = {\n    UI_A = \"second\",\n    UI_A = \"second\",\n}\n")
    );
}

#[test]
fn test_translated_multi_line_text_is_redistributed() {
    let text = "UI_EN = {\n    UI_A = \"Hello \"..\n        \"world\",\n}\n";
    let file = parse(text);
    let mut map = TranslationMap::for_language("DE");
    map.insert("UI_A", "Hallo Welt, wie geht es");
    let rendered = file.render_with(&map).unwrap();
    assert!(rendered.starts_with("UI_DE = {\n    UI_A = \""));
    let reparsed = ResourceFile::parse(&rendered, &ParseOptions::source("DE")).unwrap();
    assert_eq!(reparsed.entries.get("UI_A"), Some("Hallo Welt, wie geht es"));
}

#[test]
fn test_cached_template_renders_like_the_original() {
    let text = indoc! {r#"
        Tooltip_EN = {
            Tooltip_Cost = "Costs $5",
            Tooltip_Long = "a"..
                "b",
        }
    "#};
    let file = parse(text);
    let cached = file.template.as_ref().unwrap().to_string();
    let template: Template = cached.parse().unwrap();
    assert_eq!(render(&template, &file.entries), text);
}
