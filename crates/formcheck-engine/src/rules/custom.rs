//! Custom rules registered on a validator instance.

use crate::error::Result;
use crate::FormData;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Signature of a synchronous custom rule: value, rule parameters, whole form.
pub type RuleFn = dyn Fn(&Value, &[String], &FormData) -> bool + Send + Sync;

/// Trait for asynchronous custom rules.
///
/// Use this for checks that need I/O, such as asking a backend whether a
/// username is still available. Returning `Err` aborts the pass with an
/// engine fault; returning `Ok(false)` records the rule's message.
///
/// ## Example
///
/// ```rust,ignore
/// use formcheck_engine::prelude::*;
///
/// struct Available;
///
/// #[async_trait]
/// impl AsyncRule for Available {
///     async fn passes(&self, value: &Value, _params: &[String], _data: &FormData) -> Result<bool> {
///         Ok(value != "admin")
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncRule: Send + Sync {
    /// Check the value asynchronously.
    async fn passes(&self, value: &Value, params: &[String], data: &FormData) -> Result<bool>;
}

#[derive(Clone)]
pub(crate) struct CustomRule {
    pub(crate) check: Arc<RuleFn>,
    pub(crate) message: String,
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Clone)]
pub(crate) struct AsyncCustomRule {
    pub(crate) rule: Arc<dyn AsyncRule>,
    pub(crate) message: String,
}

impl fmt::Debug for AsyncCustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCustomRule")
            .field("message", &self.message)
            .finish()
    }
}
