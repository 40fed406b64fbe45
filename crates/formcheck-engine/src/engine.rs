//! The engine contract consumed by validation strategies.

use crate::error::{ErrorBag, Result};
use crate::{FormData, Messages, RuleSet};
use async_trait::async_trait;

/// A rule engine that can be built from data, rules and messages, run one
/// asynchronous pass and report its errors.
///
/// Strategies only talk to engines through this trait, so a different engine
/// can be swapped in without touching schema handling.
#[async_trait]
pub trait Engine: Send + Sized + 'static {
    /// Build an instance for one pass.
    ///
    /// Fails on malformed rule expressions.
    fn build(data: FormData, rules: RuleSet, messages: Option<Messages>) -> Result<Self>;

    /// Run the pass. `Ok(true)` means no errors were found.
    ///
    /// Errors found in the data are not an `Err`; they are collected in
    /// [`Engine::errors`]. `Err` is reserved for engine faults.
    async fn check_async(&mut self) -> Result<bool>;

    /// Errors collected by the last pass.
    fn errors(&self) -> &ErrorBag;
}
