//! # formcheck Strategy
//!
//! Validation strategy for form-validation mixins. A schema bundles rules,
//! custom messages and an optional customisation hook; the strategy turns it
//! into a validator for each pass and shapes the result for the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use formcheck_strategy::prelude::*;
//!
//! let mut schema: Schema = create_inactive_schema(rules, Some(messages), None);
//!
//! // The user left the email field: enable and check just that field.
//! activate_rule(&mut schema, "email");
//! let errors = validate(&data, &schema, ValidateOptions::field("email", errors)).await?;
//!
//! // On submit every rule runs, activated or not.
//! let errors = validate(&data, &schema, ValidateOptions::form()).await?;
//!
//! // Server side, failures come back as an error value.
//! match validate_server(&data, &schema).await {
//!     Ok(()) => save(data),
//!     Err(StrategyError::Validation { errors }) => respond_422(errors),
//!     Err(fault) => return Err(fault.into()),
//! }
//! ```
//!
//! ## Modes
//!
//! - Client, single field: only activated rules are checked on gated schemas,
//!   and the field's entry in the previous errors is replaced (an empty list
//!   when valid).
//! - Client, whole form: every rule is checked; only failing fields are
//!   reported.
//! - Server: every rule is checked; failures reject with
//!   `"A validation error occurred"` and the complete error map.

mod error;
mod options;
mod schema;
mod strategy;

pub use error::{BoxError, Result, StrategyError, VALIDATION_ERROR_MESSAGE};
pub use options::ValidateOptions;
pub use schema::{
    activate_all, activate_rule, create_inactive_schema, create_schema, Hook, Schema,
    SchemaDefinition,
};
pub use strategy::{
    create_validator, effective_rules, validate, validate_server, validate_with_callback,
};

pub use formcheck_engine::{Engine, ErrorMap, FormData, Messages, RuleSet, Validator};

/// Prelude module for strategies
pub mod prelude {
    pub use crate::error::{BoxError, Result, StrategyError};
    pub use crate::options::ValidateOptions;
    pub use crate::schema::{
        activate_all, activate_rule, create_inactive_schema, create_schema, Hook, Schema,
    };
    pub use crate::strategy::{
        create_validator, validate, validate_server, validate_with_callback,
    };
    pub use formcheck_engine::prelude::*;
}
