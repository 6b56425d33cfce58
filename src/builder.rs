//! Builds a template and a translation map from scanner events.

use std::path::Path;

use regex::Regex;

use crate::{
    charset::Charset,
    error::Error,
    read_options::ParseOptions,
    render::render,
    scanner::{ScanEvent, Scanner},
    template::{Placeholder, Template, WHOLE_TEXT_KEY, normalize_key},
    traits::Parser,
    types::{LANGUAGE_NAME_KEY, TranslationMap},
    warnings::WarningLog,
};

/// Consumes [`ScanEvent`]s and accumulates the parse result.
///
/// Every assignment contributes its text to the map under its normalized key.
/// When a template is requested, literals are copied verbatim and each
/// assignment contributes its raw prefix, a placeholder per fragment and its
/// raw suffix, so rendering the template with the map reproduces the input.
#[derive(Debug)]
pub struct TemplateBuilder {
    template: Option<Template>,
    entries: TranslationMap,
    warnings: WarningLog,
    header_pattern: Option<Regex>,
}

impl TemplateBuilder {
    pub fn new(options: &ParseOptions) -> Self {
        let language_id = options.language_id.as_str();
        let entries = if language_id.is_empty() {
            TranslationMap::new()
        } else {
            TranslationMap::for_language(language_id)
        };
        let header_pattern = if options.build_template && !language_id.is_empty() {
            Regex::new(&format!(r"_{}\b", regex::escape(language_id))).ok()
        } else {
            None
        };
        TemplateBuilder {
            template: options.build_template.then(Template::new),
            entries,
            warnings: WarningLog::new(),
            header_pattern,
        }
    }

    /// Records the header line. Every `_<language id>` suffix in it is bound
    /// to the language sentinel, so `Sandbox_EN = {` renders as
    /// `Sandbox_FR = {` for a French map.
    pub fn header(&mut self, line: &str) {
        let Some(template) = self.template.as_mut() else {
            return;
        };
        let Some(pattern) = &self.header_pattern else {
            template.push_literal(line);
            return;
        };
        let mut last = 0;
        for found in pattern.find_iter(line) {
            template.push_literal(&line[last..found.start() + 1]);
            template.push_placeholder(Placeholder::whole(LANGUAGE_NAME_KEY));
            last = found.end();
        }
        template.push_literal(&line[last..]);
    }

    pub fn push(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::Literal(line) => {
                if let Some(template) = self.template.as_mut() {
                    template.push_literal(&line);
                }
            }
            ScanEvent::Warning(message) => self.warnings.warn(message),
            ScanEvent::Assignment(assignment) => {
                let name = normalize_key(&assignment.key);
                if let Some(template) = self.template.as_mut() {
                    template.push_literal(&assignment.prefix);
                    if let [_single] = assignment.fragments.as_slice() {
                        template.push_placeholder(Placeholder::whole(name.as_str()));
                    } else {
                        for (index, fragment) in assignment.fragments.iter().enumerate() {
                            if index > 0 {
                                template.push_literal(&assignment.joins[index - 1]);
                            }
                            template.push_placeholder(Placeholder::part(
                                name.as_str(),
                                index,
                                fragment.chars().count(),
                            ));
                        }
                    }
                    template.push_literal(&assignment.suffix);
                }
                self.entries.insert(name, assignment.text);
            }
        }
    }

    pub fn finish(self) -> ResourceFile {
        ResourceFile {
            template: self.template,
            entries: self.entries,
            warnings: self.warnings,
        }
    }
}

/// A parsed translation file.
#[derive(Debug, Clone, Default)]
pub struct ResourceFile {
    /// Present when the file was read with [`ParseOptions::build_template`].
    pub template: Option<Template>,
    /// Normalized key to text, in declaration order. Holds the language
    /// sentinel when the file was read for a language.
    pub entries: TranslationMap,
    pub warnings: WarningLog,
}

impl ResourceFile {
    /// A file translated as one block of text, such as a map description.
    pub fn whole_text(text: &str, language_id: &str) -> Self {
        let mut entries = TranslationMap::for_language(language_id);
        entries.insert(WHOLE_TEXT_KEY, text);
        ResourceFile {
            template: Some(Template::whole_text()),
            entries,
            warnings: WarningLog::new(),
        }
    }

    /// Reads a whole-text file from disk.
    pub fn read_whole_text<P: AsRef<Path>>(
        path: P,
        charset: Charset,
        language_id: &str,
    ) -> Result<Self, Error> {
        let text = charset.read_file(path)?;
        Ok(Self::whole_text(&text, language_id))
    }

    /// Renders the template with this file's own entries.
    pub fn render(&self) -> Option<String> {
        self.render_with(&self.entries)
    }

    /// Renders the template with another map, e.g. a merged translation.
    pub fn render_with(&self, map: &TranslationMap) -> Option<String> {
        self.template.as_ref().map(|template| render(template, map))
    }
}

impl Parser for ResourceFile {
    /// The first line is a header and is never scanned for assignments.
    fn parse(text: &str, options: &ParseOptions) -> Result<Self, Error> {
        let mut builder = TemplateBuilder::new(options);
        let mut lines = text.split_inclusive('\n');
        if let Some(header) = lines.next() {
            builder.header(header);
        }

        let mut scanner = Scanner::new(options).starting_at(2);
        let mut events = Vec::new();
        for line in lines {
            scanner.feed(line, &mut events);
            for event in events.drain(..) {
                builder.push(event);
            }
        }
        scanner.finish(&mut events);
        for event in events {
            builder.push(event);
        }

        let file = builder.finish();
        tracing::debug!(
            language = %options.language_id,
            entries = file.entries.entry_count(),
            warnings = file.warnings.count(),
            "Parsed resource file"
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SANDBOX: &str = indoc! {r#"
        Sandbox_EN = {
            Sandbox_Zombies = "Zombies",
            -- comment stays
            Sandbox_Long = "Hello "..
                "world",

            Sandbox_Cost = "Costs $5",
        }
    "#};

    #[test]
    fn test_parse_source_round_trip() {
        let file = ResourceFile::parse(SANDBOX, &ParseOptions::source("EN")).unwrap();
        assert_eq!(file.render().as_deref(), Some(SANDBOX));
        assert!(file.warnings.is_empty());
    }

    #[test]
    fn test_entries_hold_decoded_text() {
        let file = ResourceFile::parse(SANDBOX, &ParseOptions::source("EN")).unwrap();
        assert_eq!(file.entries.get("Sandbox_Long"), Some("Hello world"));
        assert_eq!(file.entries.get(LANGUAGE_NAME_KEY), Some("EN"));
        assert_eq!(
            file.entries.entries().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["Sandbox_Zombies", "Sandbox_Long", "Sandbox_Cost"]
        );
    }

    #[test]
    fn test_template_text_form() {
        let file = ResourceFile::parse(SANDBOX, &ParseOptions::source("EN")).unwrap();
        let text = file.template.unwrap().to_string();
        assert!(text.starts_with("Sandbox_${__language_name__} = {\n"));
        assert!(text.contains("Sandbox_Long = \"${Sandbox_Long:0:6}\"..\n        \"${Sandbox_Long:1:5}\","));
        assert!(text.contains("\"Costs $$5\""));
    }

    #[test]
    fn test_render_for_other_language() {
        let source = ResourceFile::parse(SANDBOX, &ParseOptions::source("EN")).unwrap();
        let mut map = TranslationMap::for_language("FR");
        map.insert("Sandbox_Zombies", "Zombies");
        map.insert("Sandbox_Long", "Bonjour le monde");
        map.insert("Sandbox_Cost", "Coûte 5 $");
        let rendered = source.render_with(&map).unwrap();
        assert!(rendered.starts_with("Sandbox_FR = {\n"));
        assert!(rendered.contains("Sandbox_Long = \"Bonjour \"..\n        \"le monde\","));
        assert!(rendered.contains("\"Coûte 5 $\""));
    }

    #[test]
    fn test_header_is_never_an_assignment() {
        let text = "Title = \"not a key\"\nUI_Yes = \"Yes\"\n";
        let file = ResourceFile::parse(text, &ParseOptions::source("EN")).unwrap();
        assert!(!file.entries.contains_key("Title"));
        assert_eq!(file.render().as_deref(), Some(text));
    }

    #[test]
    fn test_header_keeps_unrelated_suffixes() {
        let text = "Sandbox_ENGLISH_EN = {\n}\n";
        let file = ResourceFile::parse(text, &ParseOptions::source("EN")).unwrap();
        assert_eq!(
            file.template.as_ref().unwrap().to_string(),
            "Sandbox_ENGLISH_${__language_name__} = {\n}\n"
        );
    }

    #[test]
    fn test_translation_read_builds_no_template() {
        let file = ResourceFile::parse(SANDBOX, &ParseOptions::translation("EN")).unwrap();
        assert!(file.template.is_none());
        assert!(file.render().is_none());
        assert_eq!(file.entries.entry_count(), 3);
    }

    #[test]
    fn test_warnings_are_collected() {
        let text = indoc! {r#"
            IG_UI_EN = {
                IGUI_A = "",
                IGUI_A = "again",
                A = "x"..
                B = "y",
            }
        "#};
        let options = ParseOptions::source("EN").with_key_prefixes(["IGUI_"]);
        let file = ResourceFile::parse(text, &options).unwrap();
        assert_eq!(
            file.warnings.messages(),
            [
                "IGUI_A is missing translation",
                "Duplicate key: IGUI_A",
                "Concat interrupted for A",
                "Possibly misspelled key: A",
                "Possibly misspelled key: B",
            ]
        );
        assert_eq!(file.entries.get("IGUI_A"), Some("again"));
    }

    #[test]
    fn test_empty_text() {
        let file = ResourceFile::parse("", &ParseOptions::source("EN")).unwrap();
        assert_eq!(file.entries.entry_count(), 0);
        assert_eq!(file.render().as_deref(), Some(""));
    }

    #[test]
    fn test_whole_text() {
        let file = ResourceFile::whole_text("A quiet town.\nPopulation: 12\n", "EN");
        assert_eq!(file.entries.get(WHOLE_TEXT_KEY), Some("A quiet town.\nPopulation: 12\n"));
        assert_eq!(file.render().as_deref(), Some("A quiet town.\nPopulation: 12\n"));
    }
}
