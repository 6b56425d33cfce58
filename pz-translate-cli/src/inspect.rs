//! `extract` and `template` commands: look at how one file is understood.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use pz_translate::{Charset, LANGUAGE_NAME_KEY, Parser, ResourceFile};
use serde_json::json;

use crate::{
    file_types::{MAP_INFO, TranslationFile},
    languages::LanguageRegistry,
};

/// Language id and file type inferred from a path like `FR/UI_FR.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub language_id: String,
    pub file: TranslationFile,
}

/// Infers the language from the `_<LANG>.txt` suffix or else from the parent
/// directory name; `language` overrides both.
pub fn identify(
    path: &Path,
    language: Option<&str>,
    registry: &LanguageRegistry,
) -> Result<FileIdentity, String> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| format!("Not a file name: {}", path.display()))?;

    if let Some((table, suffix)) = stem.rsplit_once('_') {
        let language_id = language.unwrap_or(suffix);
        if language_id == suffix || language.is_some() {
            if let Some(file) = TranslationFile::table(table) {
                return known_language(registry, language_id).map(|language_id| FileIdentity {
                    language_id,
                    file,
                });
            }
        }
    }

    let from_parent = path
        .parent()
        .and_then(|parent| parent.file_name())
        .and_then(|name| name.to_str());
    let language_id = language
        .or(from_parent)
        .ok_or_else(|| format!("Cannot tell the language of {}; use --language", path.display()))?;
    let language_id = known_language(registry, language_id)?;
    let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
    let file = match TranslationFile::table(stem) {
        Some(file) => file,
        None => TranslationFile::map_info(file_name),
    };
    Ok(FileIdentity { language_id, file })
}

fn known_language(registry: &LanguageRegistry, id: &str) -> Result<String, String> {
    if registry.contains(id) {
        Ok(id.to_string())
    } else {
        Err(format!("Unknown language: {}", id))
    }
}

fn read(path: &Path, identity: &FileIdentity, registry: &LanguageRegistry) -> Result<ResourceFile, String> {
    let charset: Charset = registry
        .charset(&identity.language_id)
        .map_err(|e| e.to_string())?;
    let result = if identity.file.name == MAP_INFO {
        ResourceFile::read_whole_text(path, charset, &identity.language_id)
    } else {
        ResourceFile::read_from(path, charset, &identity.file.source_options(&identity.language_id))
    };
    result.map_err(|e| format!("Error reading {}: {}", path.display(), e))
}

fn emit(text: &str, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(output_path) => File::create(output_path)
            .and_then(|mut f| f.write_all(text.as_bytes()))
            .map_err(|e| format!("Error writing to {}: {}", output_path.display(), e)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// JSON document with the entries and warnings of `path`.
pub fn extract_json(
    path: &Path,
    language: Option<&str>,
    registry: &LanguageRegistry,
) -> Result<serde_json::Value, String> {
    let identity = identify(path, language, registry)?;
    let mut resource = read(path, &identity, registry)?;
    resource.entries.remove(LANGUAGE_NAME_KEY);
    Ok(json!({
        "file": identity.file.label(),
        "language": identity.language_id,
        "entries": resource.entries,
        "warnings": resource.warnings,
    }))
}

pub fn run_extract_command(
    path: &Path,
    language: Option<&str>,
    output: Option<&Path>,
    registry: &LanguageRegistry,
) -> Result<(), String> {
    let document = extract_json(path, language, registry)?;
    let text = serde_json::to_string_pretty(&document)
        .map_err(|e| format!("Error serializing to JSON: {}", e))?;
    emit(&text, output)
}

/// Template text of `path`.
pub fn template_text(
    path: &Path,
    language: Option<&str>,
    registry: &LanguageRegistry,
) -> Result<String, String> {
    let identity = identify(path, language, registry)?;
    let resource = read(path, &identity, registry)?;
    Ok(resource
        .template
        .map(|template| template.to_string())
        .unwrap_or_default())
}

pub fn run_template_command(
    path: &Path,
    language: Option<&str>,
    output: Option<&Path>,
    registry: &LanguageRegistry,
) -> Result<(), String> {
    let text = template_text(path, language, registry)?;
    emit(&text, output)
}
