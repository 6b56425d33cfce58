//! Line scanner for `key = "text"` assignments.
//!
//! The scanner is a two-state machine. In [`ParserState::Idle`] every line is
//! either the start of an assignment or a literal. A line whose code part ends
//! with the `..` concatenation operator moves the scanner to
//! [`ParserState::Continuing`], where following lines contribute quoted
//! fragments until one no longer ends with `..`.
//!
//! The scanner keeps every byte of its input: an [`Assignment`] carries the raw
//! text around and between its fragments, so a template built from the events
//! reproduces the file exactly.

use std::collections::HashSet;

use crate::{read_options::ParseOptions, template::normalize_key};

/// Lua string concatenation operator.
pub const CONTINUATION: &str = "..";
/// Lua line comment marker.
pub const COMMENT: &str = "--";

const QUOTE: char = '"';

/// One event produced while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A line that holds no translatable text, including its line terminator.
    Literal(String),
    /// A complete (possibly multi-line) assignment.
    Assignment(Assignment),
    /// A recoverable problem; processing continues.
    Warning(String),
}

/// A `key = "text"` assignment, possibly continued over several lines.
///
/// The raw source is `prefix + fragments[0] + joins[0] + fragments[1] + ... + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Key as written left of `=`, trimmed.
    pub key: String,
    /// Decoded text: the fragments concatenated.
    pub text: String,
    /// 1-based line number of the first line.
    pub line: usize,
    /// Number of source lines consumed.
    pub lines: usize,
    /// Source up to and including the opening quote.
    pub prefix: String,
    /// Quoted fragments, without their quotes.
    pub fragments: Vec<String>,
    /// Source between consecutive fragments, quotes included.
    pub joins: Vec<String>,
    /// Source from the closing quote to the end of the last line.
    pub suffix: String,
}

/// Assignment being accumulated over continuation lines.
#[derive(Debug)]
struct Pending {
    key: String,
    line: usize,
    lines: usize,
    prefix: String,
    fragments: Vec<String>,
    joins: Vec<String>,
    /// Raw source since the last closing quote.
    gap: String,
}

impl Pending {
    fn push_line(&mut self, line: &str) {
        self.lines += 1;
        match (line.find(QUOTE), line.rfind(QUOTE)) {
            (Some(open), Some(close)) if close > open => {
                let mut join = std::mem::take(&mut self.gap);
                join.push_str(&line[..=open]);
                self.joins.push(join);
                self.fragments.push(line[open + 1..close].to_string());
                self.gap = line[close..].to_string();
            }
            _ => self.gap.push_str(line),
        }
    }

    fn into_assignment(self) -> Assignment {
        Assignment {
            key: self.key,
            text: self.fragments.concat(),
            line: self.line,
            lines: self.lines,
            prefix: self.prefix,
            fragments: self.fragments,
            joins: self.joins,
            suffix: self.gap,
        }
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    Idle,
    Continuing(Pending),
}

/// Positions of `=`, the opening quote and the closing quote on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Split {
    equals: usize,
    open: usize,
    close: usize,
}

/// Recognises the `key = "` pattern.
///
/// The opening quote is the first quote after the first `=`, and no quote may
/// precede that `=`. The closing quote is the last quote on the line, so text
/// may contain quote characters up to the final delimiter. A line with a
/// single quote has empty text and its suffix starts right after that quote.
fn split_assignment(line: &str) -> Option<Split> {
    let equals = line.find('=')?;
    if line[..equals].contains(QUOTE) {
        return None;
    }
    let open = equals + 1 + line[equals + 1..].find(QUOTE)?;
    let close = line
        .rfind(QUOTE)
        .filter(|&close| close > open)
        .unwrap_or(open + 1);
    Some(Split {
        equals,
        open,
        close,
    })
}

/// Whether the code part of `tail` ends with the concatenation operator.
fn ends_with_continuation(tail: &str) -> bool {
    let code = match tail.find(COMMENT) {
        Some(comment) => &tail[..comment],
        None => tail,
    };
    code.trim_end().ends_with(CONTINUATION)
}

/// Streaming assignment scanner.
///
/// Feed lines (with their terminators) in order, then call
/// [`Scanner::finish`].
#[derive(Debug)]
pub struct Scanner<'a> {
    options: &'a ParseOptions,
    state: ParserState,
    seen: HashSet<String>,
    line_number: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Scanner {
            options,
            state: ParserState::Idle,
            seen: HashSet::new(),
            line_number: 0,
        }
    }

    /// Sets the line number of the next line fed, for files whose first
    /// lines are consumed elsewhere.
    pub fn starting_at(mut self, line_number: usize) -> Self {
        self.line_number = line_number.saturating_sub(1);
        self
    }

    /// Scans a whole text.
    pub fn scan(options: &ParseOptions, text: &str) -> Vec<ScanEvent> {
        let mut scanner = Scanner::new(options);
        let mut events = Vec::new();
        for line in text.split_inclusive('\n') {
            scanner.feed(line, &mut events);
        }
        scanner.finish(&mut events);
        events
    }

    pub fn feed(&mut self, line: &str, events: &mut Vec<ScanEvent>) {
        self.line_number += 1;
        match std::mem::take(&mut self.state) {
            ParserState::Idle => self.start(line, events),
            ParserState::Continuing(mut pending) => {
                let stripped = line.trim();
                if stripped.is_empty() || stripped.starts_with(COMMENT) {
                    self.resolve(pending, events);
                    events.push(ScanEvent::Literal(line.to_string()));
                } else if split_assignment(line).is_some() {
                    events.push(ScanEvent::Warning(format!(
                        "Concat interrupted for {}",
                        pending.key
                    )));
                    self.resolve(pending, events);
                    self.start(line, events);
                } else {
                    pending.push_line(line);
                    if stripped.ends_with(CONTINUATION) && !stripped.contains(COMMENT) {
                        self.state = ParserState::Continuing(pending);
                    } else {
                        self.resolve(pending, events);
                    }
                }
            }
        }
    }

    /// Flushes an assignment still waiting for a continuation line.
    pub fn finish(&mut self, events: &mut Vec<ScanEvent>) {
        if let ParserState::Continuing(pending) = std::mem::take(&mut self.state) {
            events.push(ScanEvent::Warning(format!(
                "Concat interrupted for {}",
                pending.key
            )));
            self.resolve(pending, events);
        }
    }

    fn start(&mut self, line: &str, events: &mut Vec<ScanEvent>) {
        let stripped = line.trim();
        let split = match split_assignment(line) {
            Some(split) if !stripped.starts_with(COMMENT) => split,
            _ => {
                events.push(ScanEvent::Literal(line.to_string()));
                return;
            }
        };

        let key = line[..split.equals].trim();
        if key.is_empty() {
            events.push(ScanEvent::Warning(format!("No key in: {}", stripped)));
            events.push(ScanEvent::Literal(line.to_string()));
            return;
        }

        let pending = Pending {
            key: key.to_string(),
            line: self.line_number,
            lines: 1,
            prefix: line[..=split.open].to_string(),
            fragments: vec![line[split.open + 1..split.close].to_string()],
            joins: Vec::new(),
            gap: line[split.close..].to_string(),
        };

        if ends_with_continuation(&pending.gap) {
            self.state = ParserState::Continuing(pending);
        } else {
            self.resolve(pending, events);
        }
    }

    fn resolve(&mut self, pending: Pending, events: &mut Vec<ScanEvent>) {
        let assignment = pending.into_assignment();
        tracing::debug!(
            key = %assignment.key,
            line = assignment.line,
            lines = assignment.lines,
            "Scanned assignment"
        );

        if assignment.text.is_empty() {
            events.push(ScanEvent::Warning(format!(
                "{} is missing translation",
                assignment.key
            )));
        }
        let first_seen = self.seen.insert(normalize_key(&assignment.key));
        if !first_seen && self.options.check_duplicates {
            events.push(ScanEvent::Warning(format!(
                "Duplicate key: {}",
                assignment.key
            )));
        }
        if !self.options.accepts_key(&assignment.key) {
            events.push(ScanEvent::Warning(format!(
                "Possibly misspelled key: {}",
                assignment.key
            )));
        }
        events.push(ScanEvent::Assignment(assignment));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn assignments(events: &[ScanEvent]) -> Vec<&Assignment> {
        events
            .iter()
            .filter_map(|event| match event {
                ScanEvent::Assignment(assignment) => Some(assignment),
                _ => None,
            })
            .collect()
    }

    fn warnings(events: &[ScanEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                ScanEvent::Warning(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn raw(assignment: &Assignment) -> String {
        let mut raw = assignment.prefix.clone();
        for (index, fragment) in assignment.fragments.iter().enumerate() {
            if index > 0 {
                raw.push_str(&assignment.joins[index - 1]);
            }
            raw.push_str(fragment);
        }
        raw.push_str(&assignment.suffix);
        raw
    }

    fn raw_text(events: &[ScanEvent]) -> String {
        events
            .iter()
            .map(|event| match event {
                ScanEvent::Literal(line) => line.clone(),
                ScanEvent::Assignment(assignment) => raw(assignment),
                ScanEvent::Warning(_) => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_single_line_assignment() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "    UI_Yes = \"Yes\",\n");
        let found = assignments(&events);
        assert_eq!(found.len(), 1);
        let assignment = found[0];
        assert_eq!(assignment.key, "UI_Yes");
        assert_eq!(assignment.text, "Yes");
        assert_eq!(assignment.prefix, "    UI_Yes = \"");
        assert_eq!(assignment.suffix, "\",\n");
        assert_eq!(assignment.lines, 1);
        assert!(warnings(&events).is_empty());
    }

    #[test]
    fn test_last_quote_closes_text() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "Tooltip_A = \"Say \"hi\" now\",\n");
        assert_eq!(assignments(&events)[0].text, "Say \"hi\" now");
    }

    #[test]
    fn test_continuation_joins_fragments() {
        let options = ParseOptions::default();
        let text = "Key = \"Hello \".. \n    \"world\"\n";
        let events = Scanner::scan(&options, text);
        let found = assignments(&events);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Hello world");
        assert_eq!(found[0].fragments, vec!["Hello ", "world"]);
        assert_eq!(found[0].joins, vec!["\".. \n    \""]);
        assert!(found[0].lines > 1);
        assert!(warnings(&events).is_empty());
        assert_eq!(raw_text(&events), text);
    }

    #[test]
    fn test_interrupted_concatenation() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "KeyA = \"foo\"..\nKeyB = \"bar\"\n");
        let found = assignments(&events);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].key, "KeyA");
        assert_eq!(found[0].text, "foo");
        assert_eq!(found[1].text, "bar");
        assert_eq!(warnings(&events), vec!["Concat interrupted for KeyA"]);
    }

    #[test]
    fn test_concatenation_open_at_end_of_file() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "KeyA = \"foo\"..\n");
        assert_eq!(warnings(&events), vec!["Concat interrupted for KeyA"]);
        assert_eq!(assignments(&events)[0].text, "foo");
    }

    #[test]
    fn test_comment_line_ends_concatenation() {
        let options = ParseOptions::default();
        let text = indoc! {r#"
            Key = "a"..
            -- note
            Other = "b",
        "#};
        let events = Scanner::scan(&options, text);
        let found = assignments(&events);
        assert_eq!(found[0].text, "a");
        assert_eq!(found[0].suffix, "\"..\n");
        assert!(events.contains(&ScanEvent::Literal("-- note\n".to_string())));
        assert!(warnings(&events).is_empty());
        assert_eq!(raw_text(&events), text);
    }

    #[test]
    fn test_trailing_comment_stops_continuation() {
        let options = ParseOptions::default();
        let text = indoc! {r#"
            Key = "a"..
                "b".. -- end here
                "c",
        "#};
        let events = Scanner::scan(&options, text);
        let found = assignments(&events);
        assert_eq!(found[0].text, "ab");
        assert_eq!(found[1..].len(), 0);
        assert_eq!(raw_text(&events), text);
    }

    #[test]
    fn test_comment_after_continuation_operator_still_continues() {
        let options = ParseOptions::default();
        let text = "Key = \"a\".. -- more below\n    \"b\",\n";
        let events = Scanner::scan(&options, text);
        assert_eq!(assignments(&events)[0].text, "ab");
    }

    #[test]
    fn test_continuation_line_without_quotes_is_kept_raw() {
        let options = ParseOptions::default();
        let text = "Key = \"a\"..\n    ..\n    \"b\",\n";
        let events = Scanner::scan(&options, text);
        let found = assignments(&events);
        assert_eq!(found[0].text, "ab");
        assert_eq!(found[0].joins, vec!["\"..\n    ..\n    \""]);
        assert_eq!(found[0].lines, 3);
        assert_eq!(raw_text(&events), text);
    }

    #[test]
    fn test_empty_key_is_literal() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "   = \"orphan\",\n");
        assert!(assignments(&events).is_empty());
        assert_eq!(warnings(&events), vec!["No key in: = \"orphan\","]);
        assert_eq!(raw_text(&events), "   = \"orphan\",\n");
    }

    #[test]
    fn test_missing_duplicate_and_misspelled_keys() {
        let options = ParseOptions::source("EN").with_key_prefixes(["UI_"]);
        let text = indoc! {r#"
            UI_Empty = "",
            UI_Twice = "1",
            UI_Twice = "2",
            Ui_Typo = "x",
        "#};
        let events = Scanner::scan(&options, text);
        assert_eq!(
            warnings(&events),
            vec![
                "UI_Empty is missing translation",
                "Duplicate key: UI_Twice",
                "Possibly misspelled key: Ui_Typo",
            ]
        );
    }

    #[test]
    fn test_duplicates_detected_on_normalized_key() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "a.b = \"1\",\na-b = \"2\",\n");
        assert_eq!(warnings(&events), vec!["Duplicate key: a-b"]);
    }

    #[test]
    fn test_duplicate_check_can_be_disabled() {
        let options = ParseOptions::import("FR");
        let events = Scanner::scan(&options, "K = \"1\",\nK = \"2\",\n");
        assert!(warnings(&events).is_empty());
    }

    #[test]
    fn test_non_assignment_lines_are_literal() {
        let options = ParseOptions::default();
        let text = indoc! {r#"
            Sandbox_EN = {

                -- Sandbox_Commented = "skip",
                "quoted" = "apple style",
            }
        "#};
        let events = Scanner::scan(&options, text);
        assert!(assignments(&events).is_empty());
        assert!(warnings(&events).is_empty());
        assert_eq!(raw_text(&events), text);
    }

    #[test]
    fn test_single_quote_line_has_empty_text() {
        let options = ParseOptions::default();
        let events = Scanner::scan(&options, "Key = \"\n");
        let found = assignments(&events);
        assert_eq!(found[0].text, "");
        assert_eq!(raw(found[0]), "Key = \"\n");
        assert_eq!(warnings(&events), vec!["Key is missing translation"]);
    }

    #[test]
    fn test_line_numbers() {
        let options = ParseOptions::default();
        let mut scanner = Scanner::new(&options).starting_at(2);
        let mut events = Vec::new();
        scanner.feed("A = \"1\"..\n", &mut events);
        scanner.feed("  \"2\"\n", &mut events);
        scanner.feed("B = \"3\"\n", &mut events);
        scanner.finish(&mut events);
        let found = assignments(&events);
        assert_eq!((found[0].line, found[0].lines), (2, 2));
        assert_eq!((found[1].line, found[1].lines), (4, 1));
    }

    #[test]
    fn test_crlf_line_endings() {
        let options = ParseOptions::default();
        let text = "Key = \"Hello \"..\r\n    \"world\",\r\n";
        let events = Scanner::scan(&options, text);
        assert_eq!(assignments(&events)[0].text, "Hello world");
        assert_eq!(raw_text(&events), text);
    }
}
