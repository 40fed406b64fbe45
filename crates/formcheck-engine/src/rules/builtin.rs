//! Built-in rules.
//!
//! Each rule checks a single JSON value. Values are coerced the way form data
//! usually arrives: numbers may be sent as strings, and sizes depend on
//! whether the field is numeric.

use crate::error::{EngineError, Result};
use crate::rules::parse::RuleCall;
use crate::FormData;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified, with a mandatory dotted domain
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        ).unwrap()
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap())
}

/// The rules every engine instance understands without registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Required,
    Email,
    Url,
    Numeric,
    Integer,
    Alpha,
    AlphaNum,
    Min,
    Max,
    Between,
    Size,
    In,
    Same,
    Confirmed,
    Regex,
}

impl Builtin {
    /// Look up a built-in rule by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let rule = match name {
            "required" => Builtin::Required,
            "email" => Builtin::Email,
            "url" => Builtin::Url,
            "numeric" => Builtin::Numeric,
            "integer" => Builtin::Integer,
            "alpha" => Builtin::Alpha,
            "alpha_num" => Builtin::AlphaNum,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "between" => Builtin::Between,
            "size" => Builtin::Size,
            "in" => Builtin::In,
            "same" => Builtin::Same,
            "confirmed" => Builtin::Confirmed,
            "regex" => Builtin::Regex,
            _ => return None,
        };
        Some(rule)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Required => "required",
            Builtin::Email => "email",
            Builtin::Url => "url",
            Builtin::Numeric => "numeric",
            Builtin::Integer => "integer",
            Builtin::Alpha => "alpha",
            Builtin::AlphaNum => "alpha_num",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Between => "between",
            Builtin::Size => "size",
            Builtin::In => "in",
            Builtin::Same => "same",
            Builtin::Confirmed => "confirmed",
            Builtin::Regex => "regex",
        }
    }

    /// Implicit rules run even when the field is absent or blank.
    pub fn is_implicit(&self) -> bool {
        matches!(self, Builtin::Required)
    }

    /// Rules that make size comparisons numeric for the whole field.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Builtin::Numeric | Builtin::Integer)
    }

    /// Check `value` of `field` against this rule.
    ///
    /// `numeric` tells size rules to compare values instead of lengths.
    pub fn passes(
        &self,
        field: &str,
        value: &Value,
        call: &RuleCall,
        data: &FormData,
        numeric: bool,
    ) -> Result<bool> {
        let passed = match self {
            Builtin::Required => is_filled(value),
            Builtin::Email => text(value).is_some_and(|s| email_regex().is_match(&s)),
            Builtin::Url => text(value).is_some_and(|s| url_regex().is_match(&s)),
            Builtin::Numeric => as_number(value).is_some(),
            Builtin::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Builtin::Alpha => {
                text(value).is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
            }
            Builtin::AlphaNum => text(value)
                .is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric)),
            Builtin::Min => {
                let min = call.number_at(0)?;
                size(value, numeric).is_some_and(|size| size >= min)
            }
            Builtin::Max => {
                let max = call.number_at(0)?;
                size(value, numeric).is_some_and(|size| size <= max)
            }
            Builtin::Between => {
                let min = call.number_at(0)?;
                let max = call.number_at(1)?;
                size(value, numeric).is_some_and(|size| size >= min && size <= max)
            }
            Builtin::Size => {
                let expected = call.number_at(0)?;
                size(value, numeric).is_some_and(|size| size == expected)
            }
            Builtin::In => {
                let allowed = call.params();
                if allowed.is_empty() {
                    return Err(EngineError::invalid_parameter(
                        "in",
                        "expected at least one allowed value",
                    ));
                }
                text(value).is_some_and(|s| allowed.iter().any(|a| *a == *s))
            }
            Builtin::Same => {
                let other = call.param_at(0)?;
                data.get(&other) == Some(value)
            }
            Builtin::Confirmed => data.get(&format!("{field}_confirmation")) == Some(value),
            Builtin::Regex => {
                let regex = compile_pattern(call.raw_param()?)?;
                text(value).is_some_and(|s| regex.is_match(&s))
            }
        };
        Ok(passed)
    }
}

/// Whether a value counts as present for non-implicit rules.
pub(crate) fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.chars().any(|c| !c.is_whitespace()),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Scalar values as text, objects and arrays excluded.
fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Size of a value: numeric value, character count or item count.
fn size(value: &Value, numeric: bool) -> Option<f64> {
    if numeric {
        return as_number(value);
    }
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        _ => None,
    }
}

/// Compile a `regex:` parameter. `/pattern/flags` form supports the `i` flag.
fn compile_pattern(raw: &str) -> Result<Regex> {
    let (pattern, case_insensitive) = match raw.strip_prefix('/') {
        Some(rest) => match rest.rfind('/') {
            Some(end) => (&rest[..end], rest[end + 1..].contains('i')),
            None => (raw, false),
        },
        None => (raw, false),
    };

    let pattern = if case_insensitive {
        Cow::Owned(format!("(?i){pattern}"))
    } else {
        Cow::Borrowed(pattern)
    };

    Regex::new(&pattern).map_err(|e| {
        EngineError::invalid_parameter("regex", format!("invalid pattern '{raw}': {e}"))
    })
}
