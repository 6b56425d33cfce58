//! Deterministic translator without network access.
//!
//! Used by the test suites and by the command line `copy` provider, which
//! fills missing texts with the source text.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::translator::{TranslateError, TranslateResult, Translator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// Return the input unchanged.
    Echo,
    /// Prepend a fixed string: `"hello"` becomes `"T:hello"` for `Prefix("T:")`.
    Prefix(String),
    /// Append the target code: `"hello"` becomes `"hello_fr"`.
    Suffix,
    /// Fail every request.
    Fail(TranslateError),
    /// Answer the first `succeed` requests like [`MockMode::Echo`], then fail.
    FailAfter {
        succeed: usize,
        error: TranslateError,
    },
}

#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    batch: bool,
    requests: AtomicUsize,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        MockTranslator {
            mode,
            batch: false,
            requests: AtomicUsize::new(0),
        }
    }

    /// Makes [`Translator::translate_batch`] count as a single request.
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Requests received so far; a batch counts once.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn answer(&self, request: usize, text: &str, target: &str) -> TranslateResult<String> {
        match &self.mode {
            MockMode::Echo => Ok(text.to_string()),
            MockMode::Prefix(prefix) => Ok(format!("{prefix}{text}")),
            MockMode::Suffix => Ok(format!("{text}_{target}")),
            MockMode::Fail(error) => Err(error.clone()),
            MockMode::FailAfter { succeed, error } => {
                if request < *succeed {
                    Ok(text.to_string())
                } else {
                    Err(error.clone())
                }
            }
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target: &str) -> TranslateResult<String> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst);
        self.answer(request, text, target)
    }

    async fn translate_batch(&self, texts: &[String], target: &str) -> TranslateResult<Vec<String>> {
        if !self.batch {
            let mut translated = Vec::with_capacity(texts.len());
            for text in texts {
                translated.push(self.translate(text, target).await?);
            }
            return Ok(translated);
        }
        let request = self.requests.fetch_add(1, Ordering::SeqCst);
        texts
            .iter()
            .map(|text| self.answer(request, text, target))
            .collect()
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
