//! Append-only log of recoverable problems found during a run.

use serde::Serialize;

/// Counter plus human-readable messages for one processing run.
///
/// Nothing recorded here aborts processing; the caller reports the total at
/// the end of the run. Every message is also emitted through `tracing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningLog {
    messages: Vec<String>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.messages.push(message);
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Moves every message of `other` into this log without logging them again.
    pub fn absorb(&mut self, other: WarningLog) {
        self.messages.extend(other.messages);
    }
}
