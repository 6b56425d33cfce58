//! Rewrites existing translation files in each language's charset.
//!
//! Useful when a mod's files were saved in the wrong encoding, or right after
//! the encoding manifest is added to a repository that already has files.

use std::{collections::HashMap, path::Path};

use pz_translate::{Charset, WarningLog};

use crate::{
    file_types::{TranslationFile, discover_files},
    languages::LanguageRegistry,
    runner::write_translation,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReencodeReport {
    pub files: usize,
}

/// Parses a `LANG=CHARSET` command line value.
pub fn parse_override(value: &str) -> Result<(String, String), String> {
    let (language, charset) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected LANG=CHARSET, got `{}`", value))?;
    Charset::from_name(charset).map_err(|e| e.to_string())?;
    Ok((language.trim().to_string(), charset.trim().to_string()))
}

/// Re-encodes every file of `files` found for each known language under
/// `root`. A file is read with the charset given for its language in
/// `read_as`, or with the language's own charset when none is given, and is
/// written back in the language's own charset.
pub fn reencode(
    root: &Path,
    registry: &LanguageRegistry,
    files: &[TranslationFile],
    read_as: &HashMap<String, String>,
    warnings: &mut WarningLog,
) -> ReencodeReport {
    let mut report = ReencodeReport::default();
    for language in registry.iter() {
        if !root.join(&language.id).is_dir() {
            continue;
        }
        let write_charset = match Charset::from_name(&language.charset) {
            Ok(charset) => charset,
            Err(e) => {
                warnings.warn(format!("Skipping {}: {}", language.id, e));
                continue;
            }
        };
        let read_charset = match read_as.get(&language.id) {
            Some(name) => match Charset::from_name(name) {
                Ok(charset) => charset,
                Err(e) => {
                    warnings.warn(format!("Skipping {}: {}", language.id, e));
                    continue;
                }
            },
            None => write_charset,
        };

        for file in files {
            let path = file.path(root, &language.id);
            if !path.is_file() {
                continue;
            }
            match read_charset.read_file(&path) {
                Ok(text) => {
                    if write_translation(&path, write_charset, &text, warnings) {
                        report.files += 1;
                    }
                }
                Err(e) => warnings.warn(format!("Failed to read {}: {}", path.display(), e)),
            }
        }
    }
    tracing::info!(files = report.files, root = %root.display(), "Re-encoded translation files");
    report
}

/// Re-encodes the files discovered in the `source` language directory.
pub fn reencode_dir(
    root: &Path,
    source: &str,
    registry: &LanguageRegistry,
    read_as: &HashMap<String, String>,
    warnings: &mut WarningLog,
) -> Result<ReencodeReport, String> {
    if !root.join(source).is_dir() {
        return Err(format!("Missing source directory: {}", root.join(source).display()));
    }
    let files = discover_files(root, source, warnings);
    Ok(reencode(root, registry, &files, read_as, warnings))
}
