//! Machine translation capability.
//!
//! The merge engine only depends on the [`Translator`] trait; the command
//! line tool plugs in a network provider and tests plug in
//! [`crate::mock::MockTranslator`].

use async_trait::async_trait;
use thiserror::Error;

/// Why a translation request failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Network trouble, rate limiting or a server-side failure. Retrying later
    /// may succeed, so progress is kept for the next run.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The request itself is unacceptable (bad credentials, unsupported
    /// language, malformed response). Retrying will not help.
    #[error("permanent failure: {0}")]
    Permanent(String),

    /// The user asked the run to stop.
    #[error("cancelled")]
    Cancelled,
}

impl TranslateError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TranslateError::Transient(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TranslateError::Cancelled)
    }

    /// Errors after which the pass stops and keeps its progress.
    pub fn interrupts(&self) -> bool {
        !matches!(self, TranslateError::Permanent(_))
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

/// A machine translation provider.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` into the language identified by `target` (a provider
    /// language code such as `fr` or `zh-TW`).
    async fn translate(&self, text: &str, target: &str) -> TranslateResult<String>;

    /// Translates several texts at once. The result has one entry per input,
    /// in input order.
    ///
    /// The default implementation translates one text at a time.
    async fn translate_batch(&self, texts: &[String], target: &str) -> TranslateResult<Vec<String>> {
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.translate(text, target).await?);
        }
        Ok(translated)
    }

    /// Whether [`Translator::translate_batch`] sends a real batch request.
    fn supports_batch(&self) -> bool {
        false
    }

    /// Used in logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str, _target: &str) -> TranslateResult<String> {
            if text.is_empty() {
                return Err(TranslateError::Permanent("empty".to_string()));
            }
            Ok(text.to_uppercase())
        }

        fn provider_name(&self) -> &str {
            "upper"
        }
    }

    #[tokio::test]
    async fn test_default_batch_translates_each_text() {
        let texts = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Upper.translate_batch(&texts, "fr").await.unwrap(), vec!["A", "B"]);
        assert!(!Upper.supports_batch());
    }

    #[tokio::test]
    async fn test_default_batch_stops_at_first_error() {
        let texts = vec!["a".to_string(), String::new()];
        assert_eq!(
            Upper.translate_batch(&texts, "fr").await,
            Err(TranslateError::Permanent("empty".to_string()))
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(TranslateError::Transient("503".to_string()).interrupts());
        assert!(TranslateError::Cancelled.interrupts());
        assert!(!TranslateError::Permanent("400".to_string()).interrupts());
        assert!(TranslateError::Cancelled.is_cancelled());
        assert!(TranslateError::Transient("x".to_string()).is_transient());
    }
}
