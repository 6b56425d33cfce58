//! Shields markup tokens from machine translation.
//!
//! Game texts embed rich-text markers (`<br>`, `<RGB:1,0,0>`) and positional
//! arguments (`%1`). Translation services tend to translate or reorder them,
//! so they are replaced by surrogates the services leave alone before a text
//! is sent, and restored afterwards.

/// Token and surrogate pairs, applied in this order by both directions.
pub const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("<", "{<{"),
    (">", "}>}"),
    ("%1", "{%1}"),
    ("%2", "{%2}"),
    ("%3", "{%3}"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCodec {
    rules: Vec<(String, String)>,
}

impl Default for TagCodec {
    fn default() -> Self {
        TagCodec::new(DEFAULT_TAGS.iter().copied())
    }
}

impl TagCodec {
    pub fn new<I, T, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        TagCodec {
            rules: rules
                .into_iter()
                .map(|(token, surrogate)| (token.into(), surrogate.into()))
                .collect(),
        }
    }

    /// A codec that leaves texts untouched.
    pub fn none() -> Self {
        TagCodec { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn mask(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |text, (token, surrogate)| text.replace(token, surrogate))
    }

    pub fn unmask(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |text, (token, surrogate)| text.replace(surrogate, token))
    }
}
