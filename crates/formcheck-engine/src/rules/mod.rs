//! Rules understood by the engine.
//!
//! Built-in rules are always available. Custom rules, synchronous or
//! asynchronous, are registered on a validator instance.

mod builtin;
mod custom;
mod parse;

pub use builtin::Builtin;
pub(crate) use builtin::is_present;
pub use custom::{AsyncRule, RuleFn};
pub(crate) use custom::{AsyncCustomRule, CustomRule};
pub use parse::{parse_expression, RuleCall};
