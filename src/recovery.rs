//! Persistence of machine translations across interrupted runs.
//!
//! When a pass stops early, everything machine-translated so far is saved
//! next to the target file. The next run loads it and only asks the provider
//! for what is still missing. The file uses the game's own table syntax so
//! it can be inspected and edited like any translation file.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    builder::ResourceFile,
    charset::Charset,
    error::Error,
    read_options::ParseOptions,
    traits::Parser,
    types::{LANGUAGE_NAME_KEY, TranslationMap},
};

/// Storage for partially completed machine translation.
pub trait RecoveryStore: Send + Sync {
    /// Previously saved entries, or `None` when nothing was saved.
    fn load(&self) -> Result<Option<TranslationMap>, Error>;

    fn save(&self, entries: &TranslationMap) -> Result<(), Error>;

    /// Removes saved entries after they have been merged for good.
    fn discard(&self) -> Result<(), Error>;
}

/// Keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecovery;

impl RecoveryStore for NoRecovery {
    fn load(&self) -> Result<Option<TranslationMap>, Error> {
        Ok(None)
    }

    fn save(&self, _entries: &TranslationMap) -> Result<(), Error> {
        Ok(())
    }

    fn discard(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryRecovery {
    slot: Mutex<Option<TranslationMap>>,
}

impl MemoryRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: TranslationMap) -> Self {
        MemoryRecovery {
            slot: Mutex::new(Some(entries)),
        }
    }

    /// Current content.
    pub fn saved(&self) -> Option<TranslationMap> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl RecoveryStore for MemoryRecovery {
    fn load(&self) -> Result<Option<TranslationMap>, Error> {
        Ok(self.saved())
    }

    fn save(&self, entries: &TranslationMap) -> Result<(), Error> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(entries.clone());
        }
        Ok(())
    }

    fn discard(&self) -> Result<(), Error> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// Keeps entries in a file next to the translation target.
#[derive(Debug, Clone)]
pub struct FileRecovery {
    path: PathBuf,
    table: String,
    language_id: String,
    charset: Charset,
}

impl FileRecovery {
    /// Recovery file for the translation written to `target`.
    pub fn for_target(target: &Path, table: &str, language_id: &str, charset: Charset) -> Self {
        FileRecovery {
            path: recovery_path(target),
            table: table.to_string(),
            language_id: language_id.to_string(),
            charset,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecoveryStore for FileRecovery {
    fn load(&self) -> Result<Option<TranslationMap>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = ResourceFile::read_from(
            &self.path,
            self.charset,
            &ParseOptions::import(self.language_id.as_str()),
        )?;
        let mut entries = file.entries;
        entries.remove(LANGUAGE_NAME_KEY);
        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Loaded saved translations"
        );
        Ok(Some(entries))
    }

    fn save(&self, entries: &TranslationMap) -> Result<(), Error> {
        let text = export_table(&self.table, &self.language_id, entries);
        self.charset.write_file(&self.path, &text)?;
        tracing::info!(
            path = %self.path.display(),
            entries = entries.entry_count(),
            "Saved translations for a later run"
        );
        Ok(())
    }

    fn discard(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `UI_FR.txt` is recovered from `UI_FR_translator_temp.txt`.
pub fn recovery_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{stem}_translator_temp.txt"))
}

/// Writes `entries` as a table named `<table>_<language id>`.
///
/// The language sentinel is not exported.
pub fn export_table(table: &str, language_id: &str, entries: &TranslationMap) -> String {
    let mut out = format!("{table}_{language_id} = {{\n");
    for (key, text) in entries.entries() {
        out.push_str(&format!("    {key} = \"{text}\",\n"));
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> TranslationMap {
        let mut map = TranslationMap::for_language("FR");
        map.insert("UI_Yes", "Oui");
        map.insert("UI_Quote", "Il a dit \\\"non\\\"");
        map
    }

    #[test]
    fn test_export_table() {
        assert_eq!(
            export_table("UI", "FR", &sample()),
            "UI_FR = {\n    UI_Yes = \"Oui\",\n    UI_Quote = \"Il a dit \\\"non\\\"\",\n}\n"
        );
    }

    #[test]
    fn test_recovery_path() {
        assert_eq!(
            recovery_path(Path::new("Translate/FR/UI_FR.txt")),
            PathBuf::from("Translate/FR/UI_FR_translator_temp.txt")
        );
    }

    #[test]
    fn test_file_recovery_cycle() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("UI_FR.txt");
        let store = FileRecovery::for_target(&target, "UI", "FR", Charset::from_name("Cp1252").unwrap());
        assert_eq!(store.load().unwrap(), None);

        store.save(&sample()).unwrap();
        assert!(store.path().exists());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.get("UI_Yes"), Some("Oui"));
        assert_eq!(loaded.get("UI_Quote"), Some("Il a dit \\\"non\\\""));
        assert!(!loaded.contains_key(LANGUAGE_NAME_KEY));

        store.discard().unwrap();
        assert!(!store.path().exists());
        store.discard().unwrap();
    }

    #[test]
    fn test_memory_recovery() {
        let store = MemoryRecovery::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample()).unwrap();
        assert_eq!(store.saved().map(|m| m.entry_count()), Some(2));
        store.discard().unwrap();
        assert!(store.saved().is_none());
    }
}
