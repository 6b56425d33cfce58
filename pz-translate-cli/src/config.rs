//! `pz-translate.toml` configuration.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use pz_translate::{
    Translator,
    mock::{MockMode, MockTranslator},
};
use serde::{Deserialize, Serialize};

use crate::google::GoogleTranslateProvider;

pub const DEFAULT_CONFIG_FILE: &str = "pz-translate.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directories: Directories,
    pub translate: TranslateSection,
    pub languages: LanguagesSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    /// Translate directory used when no directory is given on the command line.
    pub translate: Option<PathBuf>,
    /// Translate directory whose files override existing translations.
    pub import: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateSection {
    pub source: String,
    /// File types to translate; empty means every file found.
    pub files: Vec<String>,
    /// Languages to translate; empty means every known language.
    pub languages_translate: Vec<String>,
    pub languages_exclude: Vec<String>,
    /// Languages whose directory may be created; `None` means all translated.
    pub languages_create: Option<Vec<String>>,
    pub create_gitattributes: bool,
    pub batch: bool,
    pub batch_size: usize,
    pub jobs: usize,
    pub provider: Provider,
}

impl Default for TranslateSection {
    fn default() -> Self {
        TranslateSection {
            source: "EN".to_string(),
            files: Vec::new(),
            languages_translate: Vec::new(),
            languages_exclude: Vec::new(),
            languages_create: None,
            create_gitattributes: true,
            batch: true,
            batch_size: 128,
            jobs: 1,
            provider: Provider::Google,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesSection {
    /// JSON file replacing the built-in language table.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Translate v2, key from `GOOGLE_TRANSLATE_API_KEY`.
    #[default]
    Google,
    /// Offline: missing texts are filled with the source text.
    Copy,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("Invalid configuration: {}", e))
    }

    /// Reads `path`, resolving relative directories against its parent.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read configuration {}: {}", path.display(), e))?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Loads the given file, or `pz-translate.toml` from the working directory
    /// when present, or the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.directories.translate,
            &mut self.directories.import,
            &mut self.languages.file,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Creates the translator for `provider`, translating from `source_code`.
pub fn build_translator(
    provider: Provider,
    source_code: &str,
    batch: bool,
) -> Result<Box<dyn Translator>, String> {
    match provider {
        Provider::Copy => Ok(Box::new(MockTranslator::new(MockMode::Echo).with_batch(batch))),
        Provider::Google => {
            let google = GoogleTranslateProvider::from_env(source_code)
                .map_err(|e| e.to_string())?
                .with_batch(batch);
            Ok(Box::new(google))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.translate.source, "EN");
        assert_eq!(config.translate.batch_size, 128);
        assert!(config.translate.create_gitattributes);
        assert_eq!(config.translate.provider, Provider::Google);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(indoc! {r#"
            [directories]
            translate = "media/lua/shared/Translate"

            [translate]
            files = ["Sandbox", "UI"]
            languages_translate = ["FR", "DE"]
            languages_create = ["FR"]
            jobs = 4
            provider = "copy"
        "#})
        .unwrap();
        assert_eq!(
            config.directories.translate,
            Some(PathBuf::from("media/lua/shared/Translate"))
        );
        assert_eq!(config.translate.files, vec!["Sandbox", "UI"]);
        assert_eq!(config.translate.languages_create, Some(vec!["FR".to_string()]));
        assert_eq!(config.translate.jobs, 4);
        assert_eq!(config.translate.provider, Provider::Copy);
        assert!(config.directories.import.is_none());
    }

    #[test]
    fn test_invalid_file() {
        let error = Config::from_toml("[translate]\njobs = \"many\"\n").unwrap_err();
        assert!(error.starts_with("Invalid configuration"));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[directories]\ntranslate = \"Translate\"\nimport = \"/abs\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.directories.translate, Some(dir.path().join("Translate")));
        assert_eq!(config.directories.import, Some(PathBuf::from("/abs")));
    }

    #[test]
    fn test_copy_provider() {
        let translator = build_translator(Provider::Copy, "en", true).unwrap();
        assert!(translator.supports_batch());
        assert_eq!(translator.provider_name(), "mock");
    }
}
