//! Orchestrates a translation run over one translate directory.
//!
//! Source files are parsed in parallel first. Then every (file, language)
//! pair becomes a pass: merge the available translations, render the source
//! template with the result and write the target file. Up to `jobs` passes
//! run concurrently; each keeps its own warning log, merged into the run log
//! when it completes.

use std::{
    fs,
    path::{Path, PathBuf},
};

use futures::{StreamExt, stream};
use rayon::prelude::*;

use pz_translate::{
    CancelFlag, Charset, Error, FileRecovery, Locale, MergeEngine, MergeSources, NoRecovery,
    ParseOptions, Parser, RecoveryStore, ResourceFile, TranslationMap, Translator, WarningLog,
};

use crate::{
    config::Config,
    file_types::{FileKind, TranslationFile, discover_files, select_files},
    gitattributes,
    languages::LanguageRegistry,
};

/// Settings of one run, after configuration and command line are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub root: PathBuf,
    pub source: String,
    pub files: Vec<String>,
    pub languages_translate: Vec<String>,
    pub languages_exclude: Vec<String>,
    pub languages_create: Option<Vec<String>>,
    pub import: Option<PathBuf>,
    pub create_gitattributes: bool,
    pub batch_size: usize,
    pub jobs: usize,
}

impl RunOptions {
    pub fn from_config(config: &Config, root: PathBuf) -> Self {
        let translate = &config.translate;
        RunOptions {
            root,
            source: translate.source.clone(),
            files: translate.files.clone(),
            languages_translate: translate.languages_translate.clone(),
            languages_exclude: translate.languages_exclude.clone(),
            languages_create: translate.languages_create.clone(),
            import: config.directories.import.clone(),
            create_gitattributes: translate.create_gitattributes,
            batch_size: translate.batch_size,
            jobs: translate.jobs.max(1),
        }
    }
}

/// What happened to one (file, language) pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Written,
    /// Stopped by a transient provider failure; progress kept for next run.
    Interrupted,
    Cancelled,
    Failed,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: usize,
    pub languages: usize,
    pub written: usize,
    pub translated: usize,
    pub interrupted: usize,
    pub cancelled: bool,
    pub warnings: WarningLog,
}

struct PassReport {
    status: PassStatus,
    translated: usize,
    warnings: WarningLog,
}

struct Pass<'s> {
    file: &'s TranslationFile,
    source: &'s ResourceFile,
    locale: &'s Locale,
}

pub struct TranslateRun<'a> {
    options: RunOptions,
    registry: &'a LanguageRegistry,
    translator: &'a dyn Translator,
    cancel: CancelFlag,
}

impl<'a> TranslateRun<'a> {
    pub fn new(
        options: RunOptions,
        registry: &'a LanguageRegistry,
        translator: &'a dyn Translator,
        cancel: CancelFlag,
    ) -> Self {
        TranslateRun {
            options,
            registry,
            translator,
            cancel,
        }
    }

    fn root(&self) -> &Path {
        &self.options.root
    }

    pub async fn run(&self) -> Result<RunSummary, String> {
        let source_locale = self
            .registry
            .get(&self.options.source)
            .ok_or_else(|| format!("Unknown source language: {}", self.options.source))?;
        let source_dir = self.root().join(&source_locale.id);
        if !source_dir.is_dir() {
            return Err(format!("Missing source directory: {}", source_dir.display()));
        }
        let source_charset = Charset::from_name(&source_locale.charset).map_err(|e| e.to_string())?;

        let mut summary = RunSummary::default();
        let import = self.import_dir(&mut summary.warnings);
        if self.options.create_gitattributes {
            if let Err(e) = gitattributes::write_manifest(self.root(), self.registry, false) {
                summary.warnings.warn(e);
            }
        }

        let languages = self.select_languages(&mut summary.warnings);
        let files = if self.options.files.is_empty() {
            discover_files(self.root(), &source_locale.id, &mut summary.warnings)
        } else {
            select_files(&self.options.files, self.root(), &source_locale.id, &mut summary.warnings)
        };
        summary.files = files.len();
        summary.languages = languages.len();
        tracing::info!(
            files = files.len(),
            languages = languages.len(),
            root = %self.root().display(),
            "Starting translation run"
        );

        let parsed: Vec<(&TranslationFile, Result<ResourceFile, Error>)> = files
            .par_iter()
            .map(|file| (file, self.parse_source(file, source_locale, source_charset)))
            .collect();

        let mut passes = Vec::new();
        for (file, result) in &parsed {
            let source = match result {
                Ok(source) => {
                    summary.warnings.absorb(source.warnings.clone());
                    source
                }
                Err(e) => {
                    summary
                        .warnings
                        .warn(format!("Failed to read {} source: {}", file.label(), e));
                    for locale in &languages {
                        self.remove_target(file, locale, &mut summary.warnings);
                    }
                    continue;
                }
            };
            for locale in &languages {
                if source.entries.entry_count() > 0 {
                    passes.push(Pass { file, source, locale });
                } else if source.template.is_some() {
                    self.copy_structure(file, source, locale, &mut summary);
                } else {
                    self.remove_target(file, locale, &mut summary.warnings);
                }
            }
        }

        let import = import.as_deref();
        let mut reports = stream::iter(passes)
            .map(|pass| self.run_pass(pass, import))
            .buffer_unordered(self.options.jobs.max(1));
        while let Some(report) = reports.next().await {
            match report.status {
                PassStatus::Written => summary.written += 1,
                PassStatus::Interrupted => summary.interrupted += 1,
                PassStatus::Cancelled => summary.cancelled = true,
                PassStatus::Failed => {}
            }
            summary.translated += report.translated;
            summary.warnings.absorb(report.warnings);
        }
        summary.cancelled |= self.cancel.is_cancelled();
        Ok(summary)
    }

    fn import_dir(&self, warnings: &mut WarningLog) -> Option<PathBuf> {
        let import = self.options.import.as_ref()?;
        if import.is_dir() {
            Some(import.clone())
        } else {
            warnings.warn(format!("Import directory {} is not valid", import.display()));
            None
        }
    }

    /// Languages to translate: configured (or all known) minus excluded and
    /// the source. A language without a directory is only kept when it may be
    /// created.
    pub fn select_languages(&self, warnings: &mut WarningLog) -> Vec<Locale> {
        let known = |id: &String, warnings: &mut WarningLog| {
            let ok = self.registry.contains(id);
            if !ok {
                warnings.warn(format!("Unknown language: {}", id));
            }
            ok
        };
        let mut exclude: Vec<&str> = Vec::new();
        for id in &self.options.languages_exclude {
            if known(id, warnings) {
                exclude.push(id);
            }
        }
        exclude.push(&self.options.source);

        let translate: Vec<&Locale> = if self.options.languages_translate.is_empty() {
            self.registry
                .iter()
                .filter(|locale| !exclude.contains(&locale.id.as_str()))
                .collect()
        } else {
            let mut selected = Vec::new();
            for id in &self.options.languages_translate {
                if known(id, warnings) && !exclude.contains(&id.as_str()) {
                    selected.extend(self.registry.get(id));
                }
            }
            selected
        };

        let mut languages = Vec::new();
        for locale in translate {
            let dir = self.root().join(&locale.id);
            let may_create = self
                .options
                .languages_create
                .as_ref()
                .is_none_or(|create| create.contains(&locale.id));
            if dir.is_dir() {
                languages.push(locale.clone());
            } else if may_create {
                match fs::create_dir_all(&dir) {
                    Ok(()) => languages.push(locale.clone()),
                    Err(e) => warnings.warn(format!("Cannot create {}: {}", dir.display(), e)),
                }
            }
        }
        languages
    }

    fn parse_source(
        &self,
        file: &TranslationFile,
        locale: &Locale,
        charset: Charset,
    ) -> Result<ResourceFile, Error> {
        let path = file.path(self.root(), &locale.id);
        match file.kind {
            FileKind::Table => ResourceFile::read_from(&path, charset, &file.source_options(&locale.id)),
            FileKind::WholeText => ResourceFile::read_whole_text(&path, charset, &locale.id),
        }
    }

    fn read_translation(
        &self,
        path: &Path,
        file: &TranslationFile,
        locale: &Locale,
        charset: Charset,
        options: ParseOptions,
        warnings: &mut WarningLog,
    ) -> Option<TranslationMap> {
        if !path.is_file() {
            return None;
        }
        let read = match file.kind {
            FileKind::Table => ResourceFile::read_from(path, charset, &options),
            FileKind::WholeText => ResourceFile::read_whole_text(path, charset, &locale.id),
        };
        match read {
            Ok(translation) => {
                warnings.absorb(translation.warnings);
                Some(translation.entries)
            }
            Err(e) => {
                warnings.warn(format!("Failed to read {}: {}", path.display(), e));
                None
            }
        }
    }

    async fn run_pass(&self, pass: Pass<'_>, import: Option<&Path>) -> PassReport {
        let Pass { file, source, locale } = pass;
        let mut warnings = WarningLog::new();
        let report = |status, translated, warnings| PassReport {
            status,
            translated,
            warnings,
        };
        if self.cancel.is_cancelled() {
            return report(PassStatus::Cancelled, 0, warnings);
        }
        tracing::info!(
            "Begin translation check for: {}, {}, {}",
            file.label(),
            locale.id,
            locale.display_name
        );

        let charset = match Charset::from_name(&locale.charset) {
            Ok(charset) => charset,
            Err(e) => {
                warnings.warn(format!("Skipping {}: {}", locale.id, e));
                return report(PassStatus::Failed, 0, warnings);
            }
        };
        let target = file.path(self.root(), &locale.id);
        let prefixes = file.key_prefixes.iter().cloned();
        let existing = self.read_translation(
            &target,
            file,
            locale,
            charset,
            ParseOptions::translation(locale.id.as_str()).with_key_prefixes(prefixes),
            &mut warnings,
        );
        let imported = import.and_then(|dir| {
            self.read_translation(
                &file.path(dir, &locale.id),
                file,
                locale,
                charset,
                ParseOptions::import(locale.id.as_str()),
                &mut warnings,
            )
        });

        let recovery: Box<dyn RecoveryStore> = match file.kind {
            FileKind::Table => Box::new(FileRecovery::for_target(&target, &file.name, &locale.id, charset)),
            FileKind::WholeText => Box::new(NoRecovery),
        };
        let engine = MergeEngine::new(self.translator)
            .with_batch_size(self.options.batch_size)
            .with_literal_escaping(file.kind == FileKind::Table)
            .with_cancel_flag(self.cancel.clone());
        let sources = MergeSources::new(&source.entries)
            .with_existing(existing.as_ref())
            .with_import(imported.as_ref());

        let outcome = match engine.merge(sources, locale, recovery.as_ref(), &mut warnings).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                tracing::info!("Cancelled {} {}; progress saved", file.label(), locale.id);
                return report(PassStatus::Cancelled, 0, warnings);
            }
            Err(e @ Error::Interrupted { .. }) => {
                warnings.warn(format!("{} {}: {}", file.label(), locale.id, e));
                return report(PassStatus::Interrupted, 0, warnings);
            }
            Err(e) => {
                warnings.warn(format!("Failed to merge {} {}: {}", file.label(), locale.id, e));
                return report(PassStatus::Failed, 0, warnings);
            }
        };

        let Some(text) = source.render_with(&outcome.map) else {
            return report(PassStatus::Failed, outcome.translated, warnings);
        };
        let status = if write_translation(&target, charset, &text, &mut warnings) {
            PassStatus::Written
        } else {
            PassStatus::Failed
        };
        report(status, outcome.translated, warnings)
    }

    /// Writes the source template with only the language sentinel bound, for
    /// source files without translatable text.
    fn copy_structure(
        &self,
        file: &TranslationFile,
        source: &ResourceFile,
        locale: &Locale,
        summary: &mut RunSummary,
    ) {
        let Some(text) = source.render_with(&TranslationMap::for_language(&locale.id)) else {
            return;
        };
        let charset = match self.registry.charset(&locale.id) {
            Ok(charset) => charset,
            Err(e) => {
                summary.warnings.warn(format!("Skipping {}: {}", locale.id, e));
                return;
            }
        };
        if write_translation(&file.path(self.root(), &locale.id), charset, &text, &mut summary.warnings) {
            summary.written += 1;
        }
    }

    fn remove_target(&self, file: &TranslationFile, locale: &Locale, warnings: &mut WarningLog) {
        let path = file.path(self.root(), &locale.id);
        match fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "Removed stale translation"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warnings.warn(format!("Failed to remove {}: {}", path.display(), e)),
        }
    }
}

/// Writes `text` in `charset`. Failures are warnings; returns whether the
/// file was written.
pub fn write_translation(path: &Path, charset: Charset, text: &str, warnings: &mut WarningLog) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warnings.warn(format!("Failed to write {}: {}", path.display(), e));
            return false;
        }
    }
    match charset.write_file(path, text) {
        Ok(0) => true,
        Ok(replaced) => {
            warnings.warn(format!(
                "{} characters could not be encoded as {} in {}",
                replaced,
                charset.name(),
                path.display()
            ));
            true
        }
        Err(e) => {
            warnings.warn(format!("Failed to write {}: {}", path.display(), e));
            false
        }
    }
}
