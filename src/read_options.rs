//! Options controlling how a resource file is read.

/// Read behavior for [`crate::traits::Parser`] implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Language id of the file being read (e.g. `EN`). Occurrences of `_<id>` in
    /// the header line are bound to the language sentinel in the template.
    pub language_id: String,
    /// Expected key prefixes for this file type. Empty disables the check.
    pub key_prefixes: Vec<String>,
    /// Whether a repeated key is reported.
    pub check_duplicates: bool,
    /// Whether a template is produced alongside the mapping.
    pub build_template: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            language_id: String::new(),
            key_prefixes: Vec::new(),
            check_duplicates: true,
            build_template: true,
        }
    }
}

impl ParseOptions {
    /// Options for reading a source file of the given language.
    pub fn source(language_id: impl Into<String>) -> Self {
        Self::default().with_language(language_id)
    }

    /// Options for reading an existing translation: mapping only.
    pub fn translation(language_id: impl Into<String>) -> Self {
        Self::source(language_id).with_template(false)
    }

    /// Options for reading an imported or recovered translation: mapping only,
    /// repeated keys are expected and not reported.
    pub fn import(language_id: impl Into<String>) -> Self {
        Self::translation(language_id).with_duplicate_check(false)
    }

    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = language_id.into();
        self
    }

    pub fn with_key_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_duplicate_check(mut self, check_duplicates: bool) -> Self {
        self.check_duplicates = check_duplicates;
        self
    }

    pub fn with_template(mut self, build_template: bool) -> Self {
        self.build_template = build_template;
        self
    }

    /// Returns `true` when `key` starts with one of the expected prefixes, or
    /// when no prefixes are configured.
    pub fn accepts_key(&self, key: &str) -> bool {
        self.key_prefixes.is_empty()
            || self
                .key_prefixes
                .iter()
                .any(|prefix| key.starts_with(prefix.as_str()))
    }
}
