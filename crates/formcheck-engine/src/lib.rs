//! # formcheck Engine
//!
//! Rule engine behind formcheck strategies. Rules are written as compact
//! expressions per field and checked against JSON form data.
//!
//! ## Example
//!
//! ```rust,ignore
//! use formcheck_engine::prelude::*;
//!
//! let mut rules = RuleSet::new();
//! rules.insert("email".into(), "required|email".into());
//!
//! let mut validator = Validator::new(data, rules, None)?;
//! let passed = validator.check_async().await?;
//! let errors = validator.errors().all();
//! ```
//!
//! ## Rules
//!
//! - `required` - Value must be present and not blank
//! - `email`, `url` - Format checks
//! - `numeric`, `integer`, `alpha`, `alpha_num` - Character classes
//! - `min:n`, `max:n`, `between:a,b` - Sizes (value for numeric fields, length otherwise)
//! - `size:n` - Exact length, or exact value for numeric fields
//! - `in:a,b,c` - Allowed values
//! - `same:field`, `confirmed` - Cross-field equality
//! - `regex:pattern` - Pattern match, `/pattern/i` for case-insensitive
//!
//! Custom rules can be registered per instance with [`Validator::register`]
//! and [`Validator::register_async`].
//!
//! ## Messages
//!
//! Custom messages are looked up as `"field.rule"` first, then `"rule"`, then
//! the message a custom rule was registered with, then the built-in default.
//! `:attribute` is replaced by the field name with `_` turned into spaces.
//! `:min`, `:max`, `:size` and `:other` take the rule's parameters.

use std::collections::BTreeMap;

mod engine;
mod error;
pub mod messages;
pub mod rules;
mod validator;

pub use engine::Engine;
pub use error::{EngineError, ErrorBag, ErrorMap, Result};
pub use rules::{AsyncRule, Builtin, RuleCall};
pub use validator::Validator;

/// Submitted form data.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// Field name to rule expression.
pub type RuleSet = BTreeMap<String, String>;

/// Custom messages keyed by `"field.rule"` or `"rule"`.
///
/// A `"rule"` key applies to every field using that rule and wins over the
/// message a custom rule was registered with. Keys never name a bare field:
/// with a field called `email`, the key `"email"` means the `email` rule.
/// Use `"email.email"` to target that field alone.
pub type Messages = BTreeMap<String, String>;

/// Prelude module for the engine
pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::error::{EngineError, ErrorBag, ErrorMap, Result};
    pub use crate::rules::AsyncRule;
    pub use crate::validator::Validator;
    pub use crate::{FormData, Messages, RuleSet};
    pub use async_trait::async_trait;
    pub use serde_json::Value;
}
