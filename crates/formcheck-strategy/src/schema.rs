//! Validation schemas and rule activation.

use crate::error::BoxError;
use formcheck_engine::{Messages, RuleSet, Validator};
use std::fmt;
use std::sync::Arc;

type HookFn<E> = dyn Fn(&mut E) -> Result<(), BoxError> + Send + Sync;

/// Customisation hook run on every freshly built validator instance.
///
/// Typical uses are registering custom rules or renaming attributes.
///
/// ## Example
///
/// ```rust,ignore
/// use formcheck_strategy::prelude::*;
///
/// let hook = Hook::new(|validator: &mut Validator| {
///     validator.register("even", "The :attribute must be even.", |value, _, _| {
///         value.as_i64().is_some_and(|n| n % 2 == 0)
///     });
///     Ok(())
/// });
/// ```
pub struct Hook<E = Validator>(Arc<HookFn<E>>);

impl<E> Hook<E> {
    /// Wrap a closure as a hook.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub(crate) fn call(&self, validator: &mut E) -> Result<(), BoxError> {
        (self.0)(validator)
    }

    /// Check if two handles point to the same hook.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Clone for Hook<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Rules, messages and hook shared by both schema modes.
pub struct SchemaDefinition<E = Validator> {
    rules: RuleSet,
    messages: Option<Messages>,
    hook: Option<Hook<E>>,
}

impl<E> Clone for SchemaDefinition<E> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            messages: self.messages.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<E> fmt::Debug for SchemaDefinition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("rules", &self.rules)
            .field("messages", &self.messages)
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

/// What to validate and how.
///
/// An `AlwaysActive` schema hands every rule to the engine on every pass. A
/// `Gated` schema starts with no rule enabled; fields are enabled one at a time
/// with [`activate_rule`] as the user interacts with them. Whole-form passes
/// ignore the gate.
pub enum Schema<E = Validator> {
    AlwaysActive(SchemaDefinition<E>),
    Gated {
        definition: SchemaDefinition<E>,
        /// Activated fields, in activation order, without duplicates
        active: Vec<String>,
    },
}

impl<E> Schema<E> {
    fn definition(&self) -> &SchemaDefinition<E> {
        match self {
            Schema::AlwaysActive(definition) => definition,
            Schema::Gated { definition, .. } => definition,
        }
    }

    fn definition_mut(&mut self) -> &mut SchemaDefinition<E> {
        match self {
            Schema::AlwaysActive(definition) => definition,
            Schema::Gated { definition, .. } => definition,
        }
    }

    /// Field name to rule expression.
    pub fn rules(&self) -> &RuleSet {
        &self.definition().rules
    }

    /// Custom messages, if any were given.
    pub fn messages(&self) -> Option<&Messages> {
        self.definition().messages.as_ref()
    }

    /// The customisation hook, if any.
    pub fn hook(&self) -> Option<&Hook<E>> {
        self.definition().hook.as_ref()
    }

    /// Activated fields. `None` for schemas without activation.
    pub fn active_rules(&self) -> Option<&[String]> {
        match self {
            Schema::AlwaysActive(_) => None,
            Schema::Gated { active, .. } => Some(active),
        }
    }

    /// Check if rules must be activated before single-field passes see them.
    pub fn is_gated(&self) -> bool {
        matches!(self, Schema::Gated { .. })
    }

    /// Replace the custom messages.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.definition_mut().messages = Some(messages);
        self
    }

    /// Replace the customisation hook.
    pub fn with_hook(mut self, hook: Hook<E>) -> Self {
        self.definition_mut().hook = Some(hook);
        self
    }
}

impl<E> Clone for Schema<E> {
    fn clone(&self) -> Self {
        match self {
            Schema::AlwaysActive(definition) => Schema::AlwaysActive(definition.clone()),
            Schema::Gated { definition, active } => Schema::Gated {
                definition: definition.clone(),
                active: active.clone(),
            },
        }
    }
}

impl<E> fmt::Debug for Schema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::AlwaysActive(definition) => {
                f.debug_tuple("AlwaysActive").field(definition).finish()
            }
            Schema::Gated { definition, active } => f
                .debug_struct("Gated")
                .field("definition", definition)
                .field("active", active)
                .finish(),
        }
    }
}

/// Create a schema whose rules are always active.
///
/// Inputs are stored as given; the engine interprets them later.
pub fn create_schema<E>(
    rules: RuleSet,
    messages: Option<Messages>,
    hook: Option<Hook<E>>,
) -> Schema<E> {
    Schema::AlwaysActive(SchemaDefinition {
        rules,
        messages,
        hook,
    })
}

/// Create a schema with every rule disabled until [`activate_rule`] enables it.
pub fn create_inactive_schema<E>(
    rules: RuleSet,
    messages: Option<Messages>,
    hook: Option<Hook<E>>,
) -> Schema<E> {
    match create_schema(rules, messages, hook) {
        Schema::AlwaysActive(definition) => Schema::Gated {
            definition,
            active: Vec::new(),
        },
        gated => gated,
    }
}

/// Enable the rule of `field`.
///
/// Does nothing on always-active schemas or when the field is already active.
pub fn activate_rule<E>(schema: &mut Schema<E>, field: &str) {
    if let Schema::Gated { active, .. } = schema {
        let newly_active = !active.iter().any(|f| f == field);
        if newly_active {
            active.push(field.to_string());
        }
        tracing::debug!(field = %field, newly_active, "activate rule");
    }
}

/// Enable every rule of a gated schema permanently.
///
/// Already active fields keep their position; the remaining rule keys follow
/// in rule order.
pub fn activate_all<E>(schema: &mut Schema<E>) {
    if let Schema::Gated { definition, active } = schema {
        for field in definition.rules.keys() {
            if !active.iter().any(|f| f == field) {
                active.push(field.clone());
            }
        }
        tracing::debug!(active = active.len(), "activate all rules");
    }
}
