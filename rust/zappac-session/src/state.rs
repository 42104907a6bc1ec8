//! The durable record of an interactive session.

use serde::Serialize;
use std::collections::BTreeMap;

/// One committed `(input, result)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub input: String,
    pub result: String,
}

impl HistoryItem {
    pub fn new(input: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            result: result.into(),
        }
    }
}

/// Session state as seen by the presentation layer.
///
/// A failed call overwrites `last_error` and keeps the previous
/// `last_result`; a successful call clears `last_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub last_error: Option<String>,
    pub last_result: String,
    /// Newest first. Entries are never edited after insertion.
    pub history: Vec<HistoryItem>,
    /// Display strings of the bindings as of the last persisted execution.
    pub variables: BTreeMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the most recent call did not fail.
    pub fn is_ok(&self) -> bool {
        self.last_error.is_none()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
