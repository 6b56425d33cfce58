use std::path::Path;

use crate::languages::LanguageRegistry;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }

    if !path.metadata().map(|m| m.is_file()).unwrap_or(false) {
        return Err(format!("Cannot read file: {}", path.display()));
    }

    Ok(())
}

/// Validate directory exists
pub fn validate_directory(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", path.display()));
    }

    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", path.display()));
    }

    Ok(())
}

/// Validate a game language id such as `EN` or `PTBR` against the registry.
pub fn validate_language_id(id: &str, registry: &LanguageRegistry) -> Result<(), String> {
    if id.is_empty() {
        return Err("Language id cannot be empty".to_string());
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Invalid language id format: {}. Expected letters and digits only, like EN or PTBR",
            id
        ));
    }

    if !registry.contains(id) {
        return Err(format!("Unknown language: {}", id));
    }

    Ok(())
}

/// Validate every id in `ids`, reporting the first invalid one.
pub fn validate_language_ids(ids: &[String], registry: &LanguageRegistry) -> Result<(), String> {
    ids.iter()
        .try_for_each(|id| validate_language_id(id, registry))
}
