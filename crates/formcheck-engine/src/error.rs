//! Error types for the rule engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Map of field name to the ordered error messages for that field.
pub type ErrorMap = HashMap<String, Vec<String>>;

/// Faults raised by the engine itself.
///
/// These are programmer errors (bad rule expressions, rules nobody registered,
/// failing async backends), never the outcome of checking user data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Invalid rule expression '{expression}' for field '{field}': {reason}")]
    Parse {
        field: String,
        expression: String,
        reason: String,
    },

    #[error("Rule '{rule}' used by field '{field}' is not defined")]
    UnknownRule { field: String, rule: String },

    #[error("Invalid parameter for rule '{rule}': {reason}")]
    InvalidParameter { rule: String, reason: String },

    #[error("Async rule '{rule}' failed: {reason}")]
    AsyncRule { rule: String, reason: String },
}

impl EngineError {
    pub(crate) fn invalid_parameter(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Collection of error messages produced by one validation pass.
///
/// Fields without errors are never stored, so [`ErrorBag::all`] only reports
/// failing fields while [`ErrorBag::get`] returns an empty list for valid ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ErrorBag {
    fields: ErrorMap,
}

impl ErrorBag {
    /// Create an empty error bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Complete field to messages mapping, failing fields only.
    pub fn all(&self) -> ErrorMap {
        self.fields.clone()
    }

    /// Messages for one field, in rule order. Empty if the field is valid.
    pub fn get(&self, field: &str) -> Vec<String> {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    /// First message for a field, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Check if a field has at least one error.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Names of the failing fields.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }

    /// Consume the bag and return the underlying map.
    pub fn into_map(self) -> ErrorMap {
        self.fields
    }
}

impl fmt::Display for ErrorBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s) across {} field(s)",
            self.len(),
            self.fields.len()
        )
    }
}

impl From<ErrorBag> for ErrorMap {
    fn from(bag: ErrorBag) -> Self {
        bag.into_map()
    }
}
