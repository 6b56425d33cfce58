//! All error types for the pz-translate crate.
//!
//! Recoverable conditions found while reading a file (empty keys, duplicate keys,
//! broken concatenations, ...) are never errors; they are recorded in a
//! [`crate::WarningLog`] instead. Everything returned here is something the caller
//! has to act on.

use thiserror::Error;

use crate::{translator::TranslateError, types::TranslationMap};

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown charset `{0}`")]
    UnknownCharset(String),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("unknown file type `{0}`")]
    UnknownFileType(String),

    #[error("template syntax error at byte {offset}: {message}")]
    Template { offset: usize, message: String },

    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    /// A translation pass stopped early. `partial` holds every entry the pass
    /// translated before it stopped.
    #[error("translation interrupted ({cause}); {kept} texts kept, {pending} left untranslated")]
    Interrupted {
        cause: TranslateError,
        partial: TranslationMap,
        kept: usize,
        pending: usize,
    },
}

impl Error {
    pub(crate) fn template(offset: usize, message: impl Into<String>) -> Self {
        Error::Template {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn interrupted(cause: TranslateError, partial: TranslationMap, pending: usize) -> Self {
        Error::Interrupted {
            cause,
            kept: partial.len(),
            partial,
            pending,
        }
    }

    /// Returns `true` when the error is a user-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Translate(cause) | Error::Interrupted { cause, .. } => cause.is_cancelled(),
            _ => false,
        }
    }

    /// Entries kept from an interrupted translation pass, if any.
    pub fn partial(&self) -> Option<&TranslationMap> {
        match self {
            Error::Interrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
