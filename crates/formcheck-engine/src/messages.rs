//! Error message lookup and interpolation.

use crate::rules::{Builtin, RuleCall};
use std::collections::HashMap;

/// Used when neither a custom nor a built-in message exists for a rule.
pub const FALLBACK_MESSAGE: &str = "The :attribute attribute has errors.";

/// Built-in message for a rule. `numeric` selects value wording over length.
pub fn default_message(rule: Builtin, numeric: bool) -> &'static str {
    match rule {
        Builtin::Required => "The :attribute field is required.",
        Builtin::Email | Builtin::Url | Builtin::Regex => "The :attribute format is invalid.",
        Builtin::Numeric => "The :attribute must be a number.",
        Builtin::Integer => "The :attribute must be an integer.",
        Builtin::Alpha => "The :attribute field must contain only alphabetic characters.",
        Builtin::AlphaNum => "The :attribute field must be alphanumeric.",
        Builtin::Min if numeric => "The :attribute must be at least :min.",
        Builtin::Min => "The :attribute must be at least :min characters.",
        Builtin::Max if numeric => "The :attribute may not be greater than :max.",
        Builtin::Max => "The :attribute may not be greater than :max characters.",
        Builtin::Between if numeric => "The :attribute field must be between :min and :max.",
        Builtin::Between => "The :attribute field must be between :min and :max characters.",
        Builtin::Size if numeric => "The :attribute must be :size.",
        Builtin::Size => "The :attribute must be :size characters.",
        Builtin::In => "The selected :attribute is invalid.",
        Builtin::Same => "The :attribute and :other must match.",
        Builtin::Confirmed => "The :attribute confirmation does not match.",
    }
}

/// Human-readable name of a field.
///
/// Configured attribute names win; otherwise `_` becomes a space.
pub fn attribute_name(field: &str, attribute_names: &HashMap<String, String>) -> String {
    attribute_names
        .get(field)
        .cloned()
        .unwrap_or_else(|| field.replace('_', " "))
}

/// Replace `:attribute` and the rule's parameter placeholders.
pub fn interpolate(template: &str, attribute: &str, call: &RuleCall) -> String {
    let mut message = template.replace(":attribute", attribute);
    let params = call.params();

    let placeholders: &[&str] = match call.name.as_str() {
        "min" => &[":min"],
        "max" => &[":max"],
        "between" => &[":min", ":max"],
        "size" => &[":size"],
        "same" => &[":other"],
        _ => &[],
    };
    for (placeholder, value) in placeholders.iter().zip(params.iter()) {
        message = message.replace(placeholder, value);
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_replace_underscores() {
        let names = HashMap::new();
        assert_eq!(attribute_name("confirm_email", &names), "confirm email");
    }

    #[test]
    fn configured_attribute_names_win() {
        let mut names = HashMap::new();
        names.insert("dob".to_string(), "date of birth".to_string());
        assert_eq!(attribute_name("dob", &names), "date of birth");
    }

    #[test]
    fn interpolates_between_bounds() {
        let call = RuleCall::new("between", Some("3,50".to_string()));
        let template = default_message(Builtin::Between, false);
        assert_eq!(
            interpolate(template, "username", &call),
            "The username field must be between 3 and 50 characters."
        );
    }

    #[test]
    fn same_message_names_the_other_field() {
        let call = RuleCall::new("same", Some("password".to_string()));
        let template = default_message(Builtin::Same, false);
        assert_eq!(
            interpolate(template, "password repeat", &call),
            "The password repeat and password must match."
        );
        assert_eq!(
            interpolate(":attribute must equal :other", "pin", &call),
            "pin must equal password"
        );
    }

    #[test]
    fn size_message() {
        let call = RuleCall::new("size", Some("5".to_string()));
        assert_eq!(
            interpolate(default_message(Builtin::Size, false), "zip", &call),
            "The zip must be 5 characters."
        );
    }

    #[test]
    fn email_default_message() {
        let call = RuleCall::new("email", None);
        let template = default_message(Builtin::Email, false);
        assert_eq!(
            interpolate(template, "confirm email", &call),
            "The confirm email format is invalid."
        );
    }
}
