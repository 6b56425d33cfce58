//! Combines every source of translated text for one target language.
//!
//! Precedence, lowest first:
//!
//! 1. the existing translation file,
//! 2. an imported translation (always wins over existing text),
//! 3. entries recovered from an interrupted run (only fill empty keys),
//! 4. fresh machine translation (only for keys still empty).

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    error::Error,
    protect::TagCodec,
    recovery::RecoveryStore,
    translator::{TranslateError, Translator},
    types::{LANGUAGE_NAME_KEY, Locale, TranslationMap},
    warnings::WarningLog,
};

/// Shared stop request, checked before each translation request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Inputs of one merge.
#[derive(Debug, Clone, Copy)]
pub struct MergeSources<'a> {
    /// Source language entries; defines which keys must be filled and in
    /// which order they are translated.
    pub source: &'a TranslationMap,
    pub existing: Option<&'a TranslationMap>,
    pub import: Option<&'a TranslationMap>,
}

impl<'a> MergeSources<'a> {
    pub fn new(source: &'a TranslationMap) -> Self {
        MergeSources {
            source,
            existing: None,
            import: None,
        }
    }

    pub fn with_existing(mut self, existing: Option<&'a TranslationMap>) -> Self {
        self.existing = existing;
        self
    }

    pub fn with_import(mut self, import: Option<&'a TranslationMap>) -> Self {
        self.import = import;
        self
    }
}

/// Result of a completed merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub map: TranslationMap,
    /// Keys filled from a recovery store.
    pub recovered: usize,
    /// Keys machine-translated during this merge.
    pub translated: usize,
    /// Keys left empty because the provider failed permanently.
    pub failed: usize,
}

pub struct MergeEngine<'a> {
    translator: Option<&'a dyn Translator>,
    codec: TagCodec,
    batch_size: usize,
    escape_literals: bool,
    cancel: CancelFlag,
}

impl<'a> MergeEngine<'a> {
    /// An engine that only merges existing, imported and recovered text.
    pub fn offline() -> Self {
        MergeEngine {
            translator: None,
            codec: TagCodec::default(),
            batch_size: 128,
            escape_literals: true,
            cancel: CancelFlag::new(),
        }
    }

    pub fn new(translator: &'a dyn Translator) -> Self {
        MergeEngine {
            translator: Some(translator),
            ..Self::offline()
        }
    }

    pub fn with_codec(mut self, codec: TagCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Texts per batch request, for providers that support batching.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Whether translated text is made safe for a quoted string literal
    /// (newlines and bare quotes escaped). Disable for whole-text files.
    pub fn with_literal_escaping(mut self, escape_literals: bool) -> Self {
        self.escape_literals = escape_literals;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Merges `sources` into the final map for `target`.
    ///
    /// On a transient provider failure or a cancellation, everything
    /// translated so far is saved to `recovery` and returned in
    /// [`Error::Interrupted`]. On a permanent failure the remaining keys are
    /// set to empty text, a warning is recorded, and the merge completes.
    pub async fn merge(
        &self,
        sources: MergeSources<'_>,
        target: &Locale,
        recovery: &dyn RecoveryStore,
        warnings: &mut WarningLog,
    ) -> Result<MergeOutcome, Error> {
        let mut map = TranslationMap::new();
        if let Some(existing) = sources.existing {
            map.overlay(existing);
        }
        if let Some(import) = sources.import {
            map.overlay(import);
        }
        map.insert(LANGUAGE_NAME_KEY, target.id.as_str());

        let saved = recovery.load()?.unwrap_or_default();
        let recovered = map.fill_gaps(&saved);

        let missing: Vec<&str> = sources
            .source
            .entries()
            .filter(|(key, _)| map.get_filled(key).is_none())
            .map(|(key, _)| key)
            .collect();

        let mut outcome = MergeOutcome {
            map,
            recovered,
            translated: 0,
            failed: 0,
        };
        let Some(translator) = self.translator.filter(|_| !missing.is_empty()) else {
            recovery.discard()?;
            return Ok(outcome);
        };

        tracing::info!(
            language = %target.id,
            provider = translator.provider_name(),
            missing = missing.len(),
            "Translating missing texts"
        );
        let mut fresh = TranslationMap::new();
        let result = if translator.supports_batch() {
            self.translate_batched(translator, &missing, sources.source, target, &mut fresh)
                .await
        } else {
            self.translate_each(translator, &missing, sources.source, target, &mut fresh)
                .await
        };

        if let Err(cause) = result {
            let pending = missing.len() - fresh.len();
            if cause.interrupts() {
                let mut keep = saved;
                keep.overlay(&fresh);
                if let Err(e) = recovery.save(&keep) {
                    warnings.warn(format!("Could not save translations for {}: {}", target.id, e));
                }
                return Err(Error::interrupted(cause, fresh, pending));
            }
            warnings.warn(format!(
                "Failed to translate {} texts into {}: {}",
                pending, target.id, cause
            ));
            for key in missing.iter().filter(|key| !fresh.contains_key(key)) {
                outcome.map.insert(*key, "");
            }
            outcome.failed = pending;
        }

        outcome.translated = fresh.len();
        outcome.map.overlay(&fresh);
        recovery.discard()?;
        Ok(outcome)
    }

    async fn translate_each(
        &self,
        translator: &dyn Translator,
        keys: &[&str],
        source: &TranslationMap,
        target: &Locale,
        fresh: &mut TranslationMap,
    ) -> Result<(), TranslateError> {
        for key in keys {
            if self.cancel.is_cancelled() {
                return Err(TranslateError::Cancelled);
            }
            let masked = self.codec.mask(source.get(key).unwrap_or_default());
            let translated = translator.translate(&masked, &target.translate_code).await?;
            fresh.insert(*key, self.finish_text(&translated));
        }
        Ok(())
    }

    async fn translate_batched(
        &self,
        translator: &dyn Translator,
        keys: &[&str],
        source: &TranslationMap,
        target: &Locale,
        fresh: &mut TranslationMap,
    ) -> Result<(), TranslateError> {
        for chunk in keys.chunks(self.batch_size) {
            if self.cancel.is_cancelled() {
                return Err(TranslateError::Cancelled);
            }
            let texts: Vec<String> = chunk
                .iter()
                .map(|key| self.codec.mask(source.get(key).unwrap_or_default()))
                .collect();
            let translated = translator
                .translate_batch(&texts, &target.translate_code)
                .await?;
            if translated.len() != texts.len() {
                return Err(TranslateError::Permanent(format!(
                    "{} returned {} texts for a batch of {}",
                    translator.provider_name(),
                    translated.len(),
                    texts.len()
                )));
            }
            for (key, text) in chunk.iter().zip(translated) {
                fresh.insert(*key, self.finish_text(&text));
            }
        }
        Ok(())
    }

    fn finish_text(&self, translated: &str) -> String {
        let text = self.codec.unmask(translated);
        if self.escape_literals {
            escape_literal(&text)
        } else {
            text
        }
    }
}

/// Makes `text` safe inside a double-quoted string literal: line breaks
/// become `\n` and quotes not already escaped get a backslash.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => continue,
            '\r' | '\n' => out.push_str("\\n"),
            '"' if backslashes % 2 == 0 => out.push_str("\\\""),
            c => out.push(c),
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }
    out
}
