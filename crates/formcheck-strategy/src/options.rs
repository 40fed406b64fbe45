//! Options for client-side validation passes.

use formcheck_engine::ErrorMap;
use serde::{Deserialize, Serialize};

/// Which part of the form a client-side pass reports.
///
/// With a `key`, only that field is reported and merged into `prev_errors`.
/// Without one, the whole form counts as submitted.
///
/// Serializes with camelCase names (`key`, `prevErrors`) so options can be
/// passed straight from UI code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOptions {
    /// Field being validated, `None` for a whole-form submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Errors currently shown, used as the base for single-field merges
    #[serde(default)]
    pub prev_errors: ErrorMap,
}

impl ValidateOptions {
    /// Options for a whole-form submission.
    pub fn form() -> Self {
        Self::default()
    }

    /// Options for validating one field on top of the errors already shown.
    pub fn field(key: impl Into<String>, prev_errors: ErrorMap) -> Self {
        Self {
            key: Some(key.into()),
            prev_errors,
        }
    }

    /// Check if this pass covers the whole form.
    pub fn is_whole_form(&self) -> bool {
        self.key.is_none()
    }
}
