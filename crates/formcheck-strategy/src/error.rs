//! Strategy error type.

use formcheck_engine::{EngineError, ErrorMap};
use thiserror::Error;

/// Boxed error returned by schema hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message carried by failed server-side validation.
pub const VALIDATION_ERROR_MESSAGE: &str = "A validation error occurred";

/// Everything a strategy can fail with.
///
/// `Validation` is the expected, data-driven outcome of a server-side pass.
/// The other variants are programmer or engine faults and are passed through
/// untouched.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The submitted data failed one or more rules.
    #[error("A validation error occurred")]
    Validation { errors: ErrorMap },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Schema hook failed: {0}")]
    Hook(#[source] BoxError),
}

impl StrategyError {
    /// Create a validation failure from the complete field error map.
    pub fn validation(errors: ErrorMap) -> Self {
        Self::Validation { errors }
    }

    /// Check if this is a data validation failure rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Field errors of a validation failure.
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    /// Consume the error and return the field errors of a validation failure.
    pub fn into_errors(self) -> Option<ErrorMap> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StrategyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_message_is_fixed() {
        let mut errors = ErrorMap::new();
        errors.insert("email".to_string(), vec!["Invalid".to_string()]);

        let err = StrategyError::validation(errors.clone());
        assert_eq!(err.to_string(), VALIDATION_ERROR_MESSAGE);
        assert!(err.is_validation());
        assert_eq!(err.errors(), Some(&errors));
        assert_eq!(err.into_errors(), Some(errors));
    }

    #[test]
    fn engine_faults_are_not_validation_failures() {
        let err: StrategyError = EngineError::UnknownRule {
            field: "zip".to_string(),
            rule: "postcode".to_string(),
        }
        .into();

        assert!(!err.is_validation());
        assert!(err.errors().is_none());
        assert!(err.to_string().starts_with("Engine error:"));
    }

    #[test]
    fn hook_errors_keep_their_source() {
        let err = StrategyError::Hook("registry unavailable".into());
        assert_eq!(err.to_string(), "Schema hook failed: registry unavailable");
        assert!(std::error::Error::source(&err).is_some());
    }
}
