//! The in-tree engine implementation.

use crate::engine::Engine;
use crate::error::{EngineError, ErrorBag, Result};
use crate::messages::{attribute_name, default_message, interpolate, FALLBACK_MESSAGE};
use crate::rules::{
    is_present, parse_expression, AsyncCustomRule, AsyncRule, Builtin, CustomRule, RuleCall,
};
use crate::{FormData, Messages, RuleSet};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Validator instance for one set of data.
///
/// Built from data, a [`RuleSet`] and optional custom [`Messages`]. Before the
/// pass runs, callers may customise it: register extra rules, rename
/// attributes for messages or stop at the first failure per field.
///
/// ## Example
///
/// ```rust,ignore
/// use formcheck_engine::prelude::*;
///
/// let mut validator = Validator::new(data, rules, None)?;
/// validator.register("even", "The :attribute must be even.", |value, _, _| {
///     value.as_i64().is_some_and(|n| n % 2 == 0)
/// });
///
/// if !validator.check_async().await? {
///     println!("{:?}", validator.errors().all());
/// }
/// ```
pub struct Validator {
    data: FormData,
    rules: Vec<(String, Vec<RuleCall>)>,
    messages: Messages,
    attribute_names: HashMap<String, String>,
    custom: HashMap<String, CustomRule>,
    async_custom: HashMap<String, AsyncCustomRule>,
    stop_on_error: bool,
    errors: ErrorBag,
}

impl Validator {
    /// Parse every rule expression and create the instance.
    pub fn new(data: FormData, rules: RuleSet, messages: Option<Messages>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|(field, expression)| {
                let calls = parse_expression(&field, &expression)?;
                Ok((field, calls))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data,
            rules,
            messages: messages.unwrap_or_default(),
            attribute_names: HashMap::new(),
            custom: HashMap::new(),
            async_custom: HashMap::new(),
            stop_on_error: false,
            errors: ErrorBag::new(),
        })
    }

    /// Register a synchronous custom rule on this instance.
    ///
    /// `message` may use `:attribute`. Custom messages from the schema still
    /// take precedence.
    pub fn register<F>(&mut self, name: impl Into<String>, message: impl Into<String>, check: F)
    where
        F: Fn(&Value, &[String], &FormData) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(
            name.into(),
            CustomRule {
                check: Arc::new(check),
                message: message.into(),
            },
        );
    }

    /// Register an asynchronous custom rule on this instance.
    pub fn register_async(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        rule: impl AsyncRule + 'static,
    ) {
        self.async_custom.insert(
            name.into(),
            AsyncCustomRule {
                rule: Arc::new(rule),
                message: message.into(),
            },
        );
    }

    /// Names used in place of field names inside messages.
    pub fn set_attribute_names(&mut self, names: HashMap<String, String>) {
        self.attribute_names = names;
    }

    /// Stop checking a field after its first failing rule.
    pub fn set_stop_on_error(&mut self, stop: bool) {
        self.stop_on_error = stop;
    }

    /// The data being validated.
    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Fields that carry rules in this instance, in evaluation order.
    pub fn fields(&self) -> Vec<&str> {
        self.rules.iter().map(|(field, _)| field.as_str()).collect()
    }

    /// Check whether a rule name resolves on this instance.
    pub fn has_rule(&self, name: &str) -> bool {
        Builtin::from_name(name).is_some()
            || self.custom.contains_key(name)
            || self.async_custom.contains_key(name)
    }

    fn message_for(&self, field: &str, call: &RuleCall, numeric: bool) -> String {
        let template = self
            .messages
            .get(&format!("{field}.{}", call.name))
            .or_else(|| self.messages.get(&call.name))
            .map(String::as_str)
            .or_else(|| self.custom.get(&call.name).map(|c| c.message.as_str()))
            .or_else(|| self.async_custom.get(&call.name).map(|c| c.message.as_str()))
            .or_else(|| Builtin::from_name(&call.name).map(|b| default_message(b, numeric)))
            .unwrap_or(FALLBACK_MESSAGE);

        let attribute = attribute_name(field, &self.attribute_names);
        interpolate(template, &attribute, call)
    }

    async fn rule_passes(
        &self,
        field: &str,
        value: &Value,
        call: &RuleCall,
        numeric: bool,
    ) -> Result<bool> {
        if let Some(builtin) = Builtin::from_name(&call.name) {
            return builtin.passes(field, value, call, &self.data, numeric);
        }
        if let Some(custom) = self.custom.get(&call.name) {
            return Ok((custom.check)(value, &call.params(), &self.data));
        }
        if let Some(custom) = self.async_custom.get(&call.name) {
            return custom.rule.passes(value, &call.params(), &self.data).await;
        }
        Err(EngineError::UnknownRule {
            field: field.to_string(),
            rule: call.name.clone(),
        })
    }

    async fn run(&mut self) -> Result<bool> {
        let mut errors = ErrorBag::new();

        for (field, calls) in &self.rules {
            let value = self.data.get(field);
            let present = is_present(value);
            let numeric = calls
                .iter()
                .any(|c| Builtin::from_name(&c.name).is_some_and(|b| b.is_numeric()));

            for call in calls {
                let implicit = Builtin::from_name(&call.name).is_some_and(|b| b.is_implicit());
                if !implicit && !present {
                    continue;
                }

                let value = value.unwrap_or(&NULL);
                if self.rule_passes(field, value, call, numeric).await? {
                    continue;
                }

                tracing::trace!(field = %field, rule = %call.name, "rule failed");
                errors.add(field.as_str(), self.message_for(field, call, numeric));
                if self.stop_on_error {
                    break;
                }
            }
        }

        self.errors = errors;
        Ok(self.errors.is_empty())
    }
}

#[async_trait]
impl Engine for Validator {
    fn build(data: FormData, rules: RuleSet, messages: Option<Messages>) -> Result<Self> {
        Validator::new(data, rules, messages)
    }

    async fn check_async(&mut self) -> Result<bool> {
        self.errors.clear();
        let passed = self.run().await?;
        // Completion is always observed after a scheduling point.
        tokio::task::yield_now().await;
        Ok(passed)
    }

    fn errors(&self) -> &ErrorBag {
        &self.errors
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields())
            .field("custom_rules", &self.custom.keys().collect::<Vec<_>>())
            .field("async_rules", &self.async_custom.keys().collect::<Vec<_>>())
            .field("stop_on_error", &self.stop_on_error)
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn form(value: Value) -> FormData {
        match value {
            Value::Object(map) => map,
            _ => panic!("form data must be an object"),
        }
    }

    fn rules(pairs: &[(&str, &str)]) -> RuleSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn reports_default_messages() {
        let data = form(json!({
            "name": "Valid name",
            "email": "not-an-email-address",
            "confirm_email": "also-invalid"
        }));
        let rules = rules(&[
            ("name", "required"),
            ("email", "required|email"),
            ("confirm_email", "required|email"),
        ]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        assert!(!validator.check_async().await.unwrap());

        let errors = validator.errors();
        assert_eq!(errors.get("name"), Vec::<String>::new());
        assert_eq!(errors.get("email"), vec!["The email format is invalid."]);
        assert_eq!(
            errors.get("confirm_email"),
            vec!["The confirm email format is invalid."]
        );
        assert_eq!(errors.all().len(), 2);
    }

    #[tokio::test]
    async fn field_specific_message_beats_rule_wide_message() {
        let data = form(json!({ "email": "nope", "backup_email": "nope" }));
        let rules = rules(&[("email", "email"), ("backup_email", "email")]);
        let mut messages = Messages::new();
        messages.insert(
            "email.email".to_string(),
            "This is not a valid email address".to_string(),
        );
        messages.insert("email".to_string(), "Bad :attribute".to_string());

        let mut validator = Validator::new(data, rules, Some(messages)).unwrap();
        validator.check_async().await.unwrap();

        assert_eq!(
            validator.errors().get("email"),
            vec!["This is not a valid email address"]
        );
        assert_eq!(validator.errors().get("backup_email"), vec!["Bad backup email"]);
    }

    #[tokio::test]
    async fn regex_patterns_keep_commas() {
        let data = form(json!({ "zip": "1234", "code": "12" }));
        let rules = rules(&[
            ("zip", "required|regex:^\\d{4,5}$"),
            ("code", "regex:^\\d{4,5}$"),
        ]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        assert!(!validator.check_async().await.unwrap());
        assert!(!validator.errors().has("zip"));
        assert_eq!(validator.errors().get("code"), vec!["The code format is invalid."]);
    }

    #[tokio::test]
    async fn same_messages_name_the_other_field() {
        let data = form(json!({ "password": "secret", "password_repeat": "secrets" }));
        let rules = rules(&[("password_repeat", "same:password")]);
        let mut messages = Messages::new();
        messages.insert(
            "password_repeat.same".to_string(),
            ":attribute must match :other".to_string(),
        );

        let mut validator = Validator::new(data, rules, Some(messages)).unwrap();
        validator.check_async().await.unwrap();

        assert_eq!(
            validator.errors().get("password_repeat"),
            vec!["password repeat must match password"]
        );
    }

    #[tokio::test]
    async fn optional_fields_skip_non_implicit_rules() {
        let data = form(json!({ "website": "" }));
        let rules = rules(&[("website", "url"), ("nickname", "min:3")]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        assert!(validator.check_async().await.unwrap());
    }

    #[tokio::test]
    async fn collects_every_failure_unless_stopped() {
        let data = form(json!({ "code": "a" }));
        let rules = rules(&[("code", "min:3|numeric")]);

        let mut validator = Validator::new(data.clone(), rules.clone(), None).unwrap();
        validator.check_async().await.unwrap();
        assert_eq!(
            validator.errors().get("code"),
            vec!["The code must be at least 3.", "The code must be a number."]
        );

        let mut validator = Validator::new(data, rules, None).unwrap();
        validator.set_stop_on_error(true);
        validator.check_async().await.unwrap();
        assert_eq!(validator.errors().get("code").len(), 1);
    }

    #[tokio::test]
    async fn custom_rules_and_attribute_names() {
        let data = form(json!({ "qty": 3 }));
        let rules = rules(&[("qty", "required|even")]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        validator.register("even", "The :attribute must be even.", |value, _, _| {
            value.as_i64().is_some_and(|n| n % 2 == 0)
        });
        let mut names = HashMap::new();
        names.insert("qty".to_string(), "quantity".to_string());
        validator.set_attribute_names(names);

        assert!(validator.has_rule("even"));
        assert!(!validator.check_async().await.unwrap());
        assert_eq!(
            validator.errors().get("qty"),
            vec!["The quantity must be even."]
        );
    }

    struct Taken {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AsyncRule for Taken {
        async fn passes(&self, value: &Value, _params: &[String], _data: &FormData) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(value != "admin")
        }
    }

    #[tokio::test]
    async fn async_rules_are_awaited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let data = form(json!({ "username": "admin" }));
        let rules = rules(&[("username", "required|available")]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        validator.register_async(
            "available",
            "The :attribute has already been taken.",
            Taken {
                calls: calls.clone(),
            },
        );

        assert!(!validator.check_async().await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            validator.errors().first("username"),
            Some("The username has already been taken.")
        );
    }

    #[tokio::test]
    async fn unknown_rules_fault_the_pass() {
        let data = form(json!({ "zip": "1234" }));
        let rules = rules(&[("zip", "postcode")]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        let err = validator.check_async().await.unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownRule {
                field: "zip".to_string(),
                rule: "postcode".to_string()
            }
        );
    }

    #[test]
    fn malformed_expressions_fail_construction() {
        let rules = rules(&[("email", "required|")]);
        let result = Validator::new(FormData::new(), rules, None);
        assert!(matches!(result, Err(EngineError::Parse { .. })));
    }

    #[tokio::test]
    async fn errors_reset_between_passes() {
        let data = form(json!({ "name": "" }));
        let rules = rules(&[("name", "required")]);

        let mut validator = Validator::new(data, rules, None).unwrap();
        validator.check_async().await.unwrap();
        assert_eq!(validator.errors().len(), 1);
        validator.check_async().await.unwrap();
        assert_eq!(validator.errors().len(), 1);
    }
}
