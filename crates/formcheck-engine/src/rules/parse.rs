//! Rule expression parsing.
//!
//! An expression is a `|` separated list of rule calls. Each call is either a
//! bare name (`required`) or a name followed by `:` and a parameter string
//! (`min:3`, `between:1,10`, `regex:/^[a-z]+$/i`).

use crate::error::{EngineError, Result};

/// One parsed rule call from an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCall {
    /// Rule name, e.g. `min`
    pub name: String,
    /// Raw parameter string after the first `:`
    pub param: Option<String>,
}

impl RuleCall {
    /// Create a rule call.
    pub fn new(name: impl Into<String>, param: Option<String>) -> Self {
        Self {
            name: name.into(),
            param,
        }
    }

    /// Parameters split on `,`.
    pub fn params(&self) -> Vec<String> {
        match &self.param {
            Some(raw) => raw.split(',').map(|p| p.trim().to_string()).collect(),
            None => Vec::new(),
        }
    }

    /// Parameter at `index`, or an `InvalidParameter` error naming the rule.
    pub(crate) fn param_at(&self, index: usize) -> Result<String> {
        self.params().into_iter().nth(index).ok_or_else(|| {
            EngineError::invalid_parameter(
                &self.name,
                format!("expected at least {} parameter(s)", index + 1),
            )
        })
    }

    /// The whole parameter string, unsplit.
    pub(crate) fn raw_param(&self) -> Result<&str> {
        self.param
            .as_deref()
            .ok_or_else(|| EngineError::invalid_parameter(&self.name, "expected a parameter"))
    }

    /// Numeric parameter at `index`.
    pub(crate) fn number_at(&self, index: usize) -> Result<f64> {
        let raw = self.param_at(index)?;
        raw.parse::<f64>().map_err(|_| {
            EngineError::invalid_parameter(&self.name, format!("'{raw}' is not a number"))
        })
    }
}

/// Parse the expression attached to `field`.
///
/// An empty expression yields no rules.
pub fn parse_expression(field: &str, expression: &str) -> Result<Vec<RuleCall>> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parse_error = |reason: &str| EngineError::Parse {
        field: field.to_string(),
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    trimmed
        .split('|')
        .map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(parse_error("empty rule segment"));
            }

            let (name, param) = match segment.split_once(':') {
                Some((name, param)) => (name.trim(), Some(param.to_string())),
                None => (segment, None),
            };

            if name.is_empty() {
                return Err(parse_error("missing rule name"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(parse_error("rule names may only contain letters, digits and '_'"));
            }

            Ok(RuleCall::new(name, param))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rule_call() -> impl Strategy<Value = RuleCall> {
        (
            "[a-z][a-z_]{0,11}",
            prop::option::of("[^|\\s]{0,16}"),
        )
            .prop_map(|(name, param)| RuleCall::new(name, param))
    }

    proptest! {
        #[test]
        fn parameters_survive_parsing_untouched(calls in prop::collection::vec(rule_call(), 1..6)) {
            let expression = calls
                .iter()
                .map(|call| match &call.param {
                    Some(param) => format!("{}:{}", call.name, param),
                    None => call.name.clone(),
                })
                .collect::<Vec<_>>()
                .join("|");

            let parsed = parse_expression("field", &expression).unwrap();
            prop_assert_eq!(parsed.len(), calls.len());
            for (parsed, call) in parsed.iter().zip(&calls) {
                prop_assert_eq!(&parsed.name, &call.name);
                prop_assert_eq!(&parsed.param, &call.param);
            }
        }
    }

    #[test]
    fn parses_bare_rules() {
        let calls = parse_expression("email", "required|email").unwrap();
        assert_eq!(
            calls,
            vec![RuleCall::new("required", None), RuleCall::new("email", None)]
        );
    }

    #[test]
    fn parses_parameters() {
        let calls = parse_expression("age", "numeric|between:18, 120").unwrap();
        assert_eq!(calls[1].name, "between");
        assert_eq!(calls[1].params(), vec!["18", "120"]);
        assert_eq!(calls[1].number_at(1).unwrap(), 120.0);
    }

    #[test]
    fn keeps_colons_inside_parameters() {
        let calls = parse_expression("time", "regex:^\\d{2}:\\d{2}$").unwrap();
        assert_eq!(calls[0].param.as_deref(), Some("^\\d{2}:\\d{2}$"));
    }

    #[test]
    fn empty_expression_has_no_rules() {
        assert!(parse_expression("notes", "  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_segments() {
        let err = parse_expression("email", "required||email").unwrap_err();
        assert!(matches!(err, EngineError::Parse { ref field, .. } if field == "email"));
    }

    #[test]
    fn rejects_missing_rule_name() {
        assert!(parse_expression("age", ":3").is_err());
        assert!(parse_expression("age", "min 3").is_err());
    }

    #[test]
    fn raw_param_keeps_commas() {
        let calls = parse_expression("zip", "regex:^\\d{4,5}$").unwrap();
        assert_eq!(calls[0].raw_param().unwrap(), "^\\d{4,5}$");
        assert_eq!(calls[0].params().len(), 2);
        assert!(RuleCall::new("regex", None).raw_param().is_err());
    }

    #[test]
    fn missing_parameter_is_reported() {
        let call = RuleCall::new("min", None);
        let err = call.number_at(0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { ref rule, .. } if rule == "min"));
    }
}
