//! Translation file types and how they are found on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use pz_translate::{ParseOptions, WarningLog};

/// Known table files and the key prefixes their keys are expected to use.
/// An empty prefix list disables the misspelled key check.
pub const TABLES: &[(&str, &[&str])] = &[
    ("Challenge", &["Challenge_"]),
    ("ContextMenu", &["ContextMenu_"]),
    ("DynamicRadio", &[]),
    ("EvolvedRecipeName", &[]),
    ("Farming", &["Farming_"]),
    ("GameSound", &["GameSound_"]),
    ("IG_UI", &["IGUI"]),
    ("ItemName", &[]),
    ("MakeUp", &["MakeUp"]),
    ("Moodles", &["Moodles_"]),
    ("Moveables", &[]),
    ("MultiStageBuild", &["MultiStageBuild_"]),
    ("Recipes", &[]),
    ("Recorded_Media", &["RM_"]),
    ("Sandbox", &["Sandbox_"]),
    ("Stash", &["Stash_"]),
    ("SurvivalGuide", &["SurvivalGuide_"]),
    ("Tooltip", &["Tooltip_"]),
    ("UI", &["UI_"]),
];

/// Name of the whole-text file type.
pub const MAP_INFO: &str = "MapInfo";

/// Map description files translated as a whole.
const MAP_INFO_FILES: &[&str] = &["title.txt", "description.txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `key = "text"` assignments in a `<name>_<LANG> = { ... }` table.
    Table,
    /// The whole file is one text.
    WholeText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFile {
    pub name: String,
    pub kind: FileKind,
    pub key_prefixes: Vec<String>,
    /// Path below a language directory, for whole-text files.
    relative: Option<PathBuf>,
}

impl TranslationFile {
    /// A known table type, or `None` for an unknown name.
    pub fn table(name: &str) -> Option<Self> {
        TABLES
            .iter()
            .find(|(table, _)| *table == name)
            .map(|(table, prefixes)| TranslationFile {
                name: table.to_string(),
                kind: FileKind::Table,
                key_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                relative: None,
            })
    }

    pub fn map_info(relative: impl Into<PathBuf>) -> Self {
        TranslationFile {
            name: MAP_INFO.to_string(),
            kind: FileKind::WholeText,
            key_prefixes: Vec::new(),
            relative: Some(relative.into()),
        }
    }

    /// Path of this file for `language_id`, relative to the translate directory.
    pub fn relative_path(&self, language_id: &str) -> PathBuf {
        match &self.relative {
            Some(relative) => Path::new(language_id).join(relative),
            None => Path::new(language_id).join(format!("{}_{}.txt", self.name, language_id)),
        }
    }

    pub fn path(&self, root: &Path, language_id: &str) -> PathBuf {
        root.join(self.relative_path(language_id))
    }

    /// How the source file of this type is read.
    pub fn source_options(&self, language_id: &str) -> ParseOptions {
        ParseOptions::source(language_id).with_key_prefixes(self.key_prefixes.iter().cloned())
    }

    /// Shown in logs: `UI` or `MapInfo (MyMap/title.txt)`.
    pub fn label(&self) -> String {
        match &self.relative {
            Some(relative) => format!("{} ({})", self.name, relative.display()),
            None => self.name.clone(),
        }
    }
}

/// Resolves configured file type names, warning about unknown ones and
/// skipping those without a source file.
pub fn select_files(
    names: &[String],
    root: &Path,
    source_id: &str,
    warnings: &mut WarningLog,
) -> Vec<TranslationFile> {
    names
        .iter()
        .filter_map(|name| {
            let file = TranslationFile::table(name.trim());
            if file.is_none() {
                warnings.warn(format!("Unknown translation type: {}", name));
            }
            file
        })
        .filter(|file| file.path(root, source_id).is_file())
        .collect()
}

/// Finds every translatable file in the source language directory.
///
/// `<name>_<LANG>.txt` files become tables; `title.txt` and `description.txt`
/// anywhere below a sub-directory become whole-text files.
pub fn discover_files(root: &Path, source_id: &str, warnings: &mut WarningLog) -> Vec<TranslationFile> {
    let source_dir = root.join(source_id);
    let suffix = format!("_{}.txt", source_id);
    let mut files = Vec::new();

    for path in sorted_entries(&source_dir, warnings) {
        if path.is_dir() {
            let mut found = Vec::new();
            collect_map_info(&path, &mut found, warnings);
            files.extend(found.into_iter().filter_map(|map_file| {
                map_file
                    .strip_prefix(&source_dir)
                    .ok()
                    .map(TranslationFile::map_info)
            }));
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if let Some(name) = file_name.strip_suffix(&suffix) {
            match TranslationFile::table(name) {
                Some(file) => files.push(file),
                None => warnings.warn(format!("Unknown translation type: {}", name)),
            }
        }
    }
    tracing::debug!(count = files.len(), dir = %source_dir.display(), "Discovered source files");
    files
}

fn collect_map_info(dir: &Path, found: &mut Vec<PathBuf>, warnings: &mut WarningLog) {
    for path in sorted_entries(dir, warnings) {
        if path.is_dir() {
            collect_map_info(&path, found, warnings);
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| MAP_INFO_FILES.contains(&name))
        {
            found.push(path);
        }
    }
}

fn sorted_entries(dir: &Path, warnings: &mut WarningLog) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok().map(|e| e.path())).collect();
            paths.sort();
            paths
        }
        Err(e) => {
            warnings.warn(format!("Cannot read directory {}: {}", dir.display(), e));
            Vec::new()
        }
    }
}
