//! Translation file engine for Project Zomboid mods.
//!
//! Reads the game's Lua-like `key = "text"` translation tables (including
//! texts continued over several lines with `..`), turns a source file into a
//! reusable template plus a key to text map, merges existing, imported,
//! recovered and machine-translated text for a target language, and renders
//! the template back into a file that keeps the source layout.

pub mod builder;
pub mod charset;
pub mod error;
pub mod merge;
pub mod mock;
pub mod protect;
pub mod read_options;
pub mod recovery;
pub mod render;
pub mod scanner;
pub mod template;
pub mod traits;
pub mod translator;
pub mod types;
pub mod warnings;

// Re-export most used types for easy consumption
pub use crate::{
    builder::{ResourceFile, TemplateBuilder},
    charset::Charset,
    error::Error,
    merge::{CancelFlag, MergeEngine, MergeOutcome, MergeSources},
    protect::TagCodec,
    read_options::ParseOptions,
    recovery::{FileRecovery, MemoryRecovery, NoRecovery, RecoveryStore},
    render::render,
    scanner::{Assignment, ScanEvent, Scanner},
    template::{Template, normalize_key},
    traits::Parser,
    translator::{TranslateError, Translator},
    types::{LANGUAGE_NAME_KEY, Locale, TranslationMap},
    warnings::WarningLog,
};
