//! CLI library for testing purposes

pub mod config;
pub mod file_types;
pub mod gitattributes;
pub mod google;
pub mod inspect;
pub mod languages;
pub mod project;
pub mod reencode;
pub mod runner;
pub mod validation;

use std::path::{Path, PathBuf};

use pz_translate::CancelFlag;

pub use config::{Config, Provider};
pub use languages::LanguageRegistry;
pub use runner::{RunOptions, RunSummary, TranslateRun};

use crate::{
    config::build_translator,
    project::{Target, resolve_target},
    validation::{validate_directory, validate_language_ids},
};

/// Command line values of `translate` that override the configuration.
#[derive(Debug, Clone, Default)]
pub struct TranslateArgs {
    pub dir: Option<PathBuf>,
    pub source: Option<String>,
    pub languages: Vec<String>,
    pub files: Vec<String>,
    pub import: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub provider: Option<Provider>,
    pub no_batch: bool,
}

impl TranslateArgs {
    /// Copies every value given on the command line into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.dir {
            config.directories.translate = Some(dir.clone());
        }
        if let Some(source) = &self.source {
            config.translate.source = source.clone();
        }
        if !self.languages.is_empty() {
            config.translate.languages_translate = self.languages.clone();
        }
        if !self.files.is_empty() {
            config.translate.files = self.files.clone();
        }
        if let Some(import) = &self.import {
            config.directories.import = Some(import.clone());
        }
        if let Some(jobs) = self.jobs {
            config.translate.jobs = jobs;
        }
        if let Some(provider) = self.provider {
            config.translate.provider = provider;
        }
        if self.no_batch {
            config.translate.batch = false;
        }
    }
}

/// The registry named by the configuration, or the built-in one.
pub fn load_registry(config: &Config) -> Result<LanguageRegistry, String> {
    match &config.languages.file {
        Some(path) => LanguageRegistry::load(path)
            .map_err(|e| format!("Cannot load languages from {}: {}", path.display(), e)),
        None => Ok(LanguageRegistry::builtin()),
    }
}

/// The directory a command works on: the given one, else the configured
/// translate directory, else the working directory.
pub fn target_dir(dir: Option<&Path>, config: &Config) -> PathBuf {
    dir.map(Path::to_path_buf)
        .or_else(|| config.directories.translate.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Runs `translate` over every translate directory below
/// `config.directories.translate` and sums up the outcome.
pub async fn run_translate_command(
    config: &Config,
    registry: &LanguageRegistry,
    cancel: CancelFlag,
) -> Result<RunSummary, String> {
    let dir = target_dir(None, config);
    validate_directory(&dir)?;
    validate_language_ids(std::slice::from_ref(&config.translate.source), registry)?;

    let mut total = RunSummary::default();
    let target = resolve_target(&dir, &mut total.warnings)?;
    tracing::info!("Translating {}", target.describe());

    let source_code = registry
        .get(&config.translate.source)
        .map(|locale| locale.translate_code.clone())
        .unwrap_or_default();
    let translator = build_translator(config.translate.provider, &source_code, config.translate.batch)?;
    tracing::debug!(provider = translator.provider_name(), "Using translator");

    for translate_dir in target.translate_dirs() {
        if cancel.is_cancelled() {
            total.cancelled = true;
            break;
        }
        let options = RunOptions::from_config(config, translate_dir.clone());
        let run = TranslateRun::new(options, registry, &*translator, cancel.clone());
        match run.run().await {
            Ok(summary) => absorb_summary(&mut total, summary),
            // One broken mod must not stop the rest of a project.
            Err(e) if matches!(target, Target::Project { .. }) => {
                total.warnings.warn(format!("{}: {}", translate_dir.display(), e));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

fn absorb_summary(total: &mut RunSummary, summary: RunSummary) {
    total.files += summary.files;
    total.languages = total.languages.max(summary.languages);
    total.written += summary.written;
    total.translated += summary.translated;
    total.interrupted += summary.interrupted;
    total.cancelled |= summary.cancelled;
    total.warnings.absorb(summary.warnings);
}
