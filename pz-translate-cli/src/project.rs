//! Finds the translate directories below a project, a mod, or a plain directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use pz_translate::WarningLog;

pub const PROJECT_FILE: &str = "project.json";
pub const MOD_FILE: &str = "mod.info";

/// The parts of `project.json` that matter here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub mods: Vec<String>,
    pub workshop: Workshop,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Workshop {
    pub excludes: Vec<String>,
}

/// What a directory given on the command line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A project listing several mods.
    Project { name: String, translate_dirs: Vec<PathBuf> },
    /// A single mod with a `mod.info` file.
    Mod { name: String, translate_dir: PathBuf },
    /// A translate directory holding one sub-directory per language.
    Directory(PathBuf),
}

impl Target {
    pub fn translate_dirs(&self) -> Vec<PathBuf> {
        match self {
            Target::Project { translate_dirs, .. } => translate_dirs.clone(),
            Target::Mod { translate_dir, .. } => vec![translate_dir.clone()],
            Target::Directory(dir) => vec![dir.clone()],
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Target::Project { name, .. } => format!("project: {}", name),
            Target::Mod { name, .. } => format!("mod: {}", name),
            Target::Directory(dir) => format!("directory: {}", dir.display()),
        }
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// `media/lua/shared/Translate` of the mod at `dir`, if `dir` is a mod with
/// such a directory.
pub fn mod_translate_dir(dir: &Path, warnings: &mut WarningLog) -> Option<PathBuf> {
    if !dir.join(MOD_FILE).is_file() {
        return None;
    }
    let translate_dir = dir.join("media").join("lua").join("shared").join("Translate");
    if translate_dir.is_dir() {
        Some(translate_dir)
    } else {
        warnings.warn(format!(
            "Invalid mod translation dir: {}",
            translate_dir.display()
        ));
        None
    }
}

/// Classifies `dir`.
///
/// A project is used when its `project.json` lists at least one translatable
/// mod, a mod when it has a translate directory; otherwise `dir` itself is
/// treated as a translate directory.
pub fn resolve_target(dir: &Path, warnings: &mut WarningLog) -> Result<Target, String> {
    if !dir.is_dir() {
        return Err(format!("Directory {} does not exist", dir.display()));
    }

    let project_file = dir.join(PROJECT_FILE);
    if project_file.is_file() {
        let text = std::fs::read_to_string(&project_file)
            .map_err(|e| format!("Cannot read {}: {}", project_file.display(), e))?;
        let project: Project = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid {}: {}", project_file.display(), e))?;
        let translate_dirs: Vec<PathBuf> = project
            .mods
            .iter()
            .filter(|id| !project.workshop.excludes.contains(id))
            .filter_map(|id| mod_translate_dir(&dir.join(id), warnings))
            .collect();
        if !translate_dirs.is_empty() {
            return Ok(Target::Project {
                name: dir_name(dir),
                translate_dirs,
            });
        }
    }

    if let Some(translate_dir) = mod_translate_dir(dir, warnings) {
        return Ok(Target::Mod {
            name: dir_name(dir),
            translate_dir,
        });
    }

    Ok(Target::Directory(dir.to_path_buf()))
}
