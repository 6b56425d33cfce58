//! `.gitattributes` manifest telling git how each language directory is encoded.
//!
//! Git stores the files as UTF-8 and converts them to the game's encoding in
//! the working tree, so diffs stay readable for every language.

use std::{fs, path::Path};

use crate::languages::LanguageRegistry;

pub const FILE_NAME: &str = ".gitattributes";

/// Files the game always reads as UTF-8, whatever the language.
const UTF8_FILES: &[&str] = &["credits.txt", "language.txt", "Translated by.txt"];

pub fn manifest(registry: &LanguageRegistry) -> String {
    let mut out = String::from("# Translation files are encoded differently per-language\n");
    for language in registry.iter() {
        out.push_str(&format!(
            "{}/*.txt text working-tree-encoding={} encoding=utf-8\n",
            language.id,
            language.charset.to_ascii_lowercase()
        ));
    }
    for name in UTF8_FILES {
        out.push_str(&format!(
            "*/{} text working-tree-encoding=utf-8 encoding=utf-8\n",
            name
        ));
    }
    out
}

/// Writes the manifest into `dir`. An existing file is kept unless `force`
/// is set. Returns whether the file was written.
pub fn write_manifest(dir: &Path, registry: &LanguageRegistry, force: bool) -> Result<bool, String> {
    let path = dir.join(FILE_NAME);
    if path.is_dir() {
        return Err(format!("{} is a directory", path.display()));
    }
    if path.exists() && !force {
        tracing::debug!(path = %path.display(), "Encoding manifest already present");
        return Ok(false);
    }
    fs::write(&path, manifest(registry))
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "Wrote encoding manifest");
    Ok(true)
}
