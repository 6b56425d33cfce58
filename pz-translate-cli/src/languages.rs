//! Languages the game ships translation directories for.

use std::{fs, path::Path};

use pz_translate::{Charset, Error, Locale};

/// `(id, display name, charset, translate code)`.
const BUILTIN: &[(&str, &str, &str, &str)] = &[
    ("AR", "Español (Argentina)", "Cp1252", "es"),
    ("CA", "Català", "ISO-8859-15", "ca"),
    ("CH", "Traditional Chinese", "UTF-8", "zh-TW"),
    ("CN", "Simplified Chinese", "UTF-8", "zh-CN"),
    ("CS", "Čeština", "Cp1250", "cs"),
    ("DA", "Dansk", "Cp1252", "da"),
    ("DE", "Deutsch", "Cp1252", "de"),
    ("EN", "English", "Cp1252", "en"),
    ("ES", "Español", "Cp1252", "es"),
    ("FI", "Suomi", "Cp1252", "fi"),
    ("FR", "Français", "Cp1252", "fr"),
    ("HU", "Magyar", "Cp1250", "hu"),
    ("ID", "Indonesia", "UTF-8", "id"),
    ("IT", "Italiano", "Cp1252", "it"),
    ("JP", "Japanese", "UTF-8", "ja"),
    ("KO", "Korean", "UTF-16", "ko"),
    ("NL", "Nederlands", "Cp1252", "nl"),
    ("NO", "Norsk", "Cp1252", "no"),
    ("PH", "Tagalog", "UTF-8", "tl"),
    ("PL", "Polski", "Cp1250", "pl"),
    ("PT", "Português", "Cp1252", "pt"),
    ("PTBR", "Português Brasileiro", "Cp1252", "pt"),
    ("RO", "Română", "UTF-8", "ro"),
    ("RU", "Русский", "Cp1251", "ru"),
    ("TH", "Thai", "UTF-8", "th"),
    ("TR", "Türkçe", "Cp1254", "tr"),
    ("UA", "Українська", "Cp1251", "uk"),
];

/// Ordered, immutable set of known languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<Locale>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageRegistry {
    pub fn builtin() -> Self {
        LanguageRegistry {
            languages: BUILTIN
                .iter()
                .map(|(id, name, charset, code)| Locale::new(*id, *name, *charset, *code))
                .collect(),
        }
    }

    /// Loads a JSON array of `{ id, display_name, charset, translate_code }`.
    ///
    /// Every charset must be known, so a bad registry fails before any file
    /// is touched.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let languages: Vec<Locale> = serde_json::from_str(text)?;
        for language in &languages {
            Charset::from_name(&language.charset)?;
        }
        Ok(LanguageRegistry { languages })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn get(&self, id: &str) -> Option<&Locale> {
        self.languages.iter().find(|language| language.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Charset of a known language.
    pub fn charset(&self, id: &str) -> Result<Charset, Error> {
        let language = self
            .get(id)
            .ok_or_else(|| Error::UnknownLanguage(id.to_string()))?;
        Charset::from_name(&language.charset)
    }
}
