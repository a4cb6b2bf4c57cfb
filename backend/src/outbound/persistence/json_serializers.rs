//! Shared JSON serialization helpers for outbound Diesel adapters.
//!
//! Encode helpers convert domain types to `serde_json::Value` for JSONB
//! persistence. Decode helpers reverse this for read-side adapters,
//! validating through domain constructors so malformed payloads surface as
//! typed errors rather than silent data corruption.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::{FieldOption, FieldType, ValidationRules};

pub(super) fn field_options_to_json(options: &[FieldOption]) -> Value {
    Value::Array(
        options
            .iter()
            .map(|option| {
                Value::Object(Map::from_iter([
                    ("value".to_owned(), Value::String(option.value.clone())),
                    ("label".to_owned(), Value::String(option.label.clone())),
                ]))
            })
            .collect(),
    )
}

/// Encode any serialisable domain value, naming it in the error.
pub(super) fn to_json<T: Serialize>(value: &T, what: &str) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("{what} encode: {e}"))
}

// ---------------------------------------------------------------------------
// Decode helpers (JSONB → domain)
// ---------------------------------------------------------------------------

/// Decode a JSONB column into `T`, naming the column in the error.
pub(super) fn from_json<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("{what} decode: {e}"))
}

/// Decode the option list of a choice field.
pub(super) fn json_to_field_options(value: Value) -> Result<Vec<FieldOption>, String> {
    from_json(value, "field options")
}

/// Re-parse stored rules for `field_type` so patterns are compiled again.
///
/// # Examples
///
/// ```rust,ignore
/// let rules = json_to_validation_rules(FieldType::Number, &json!({"min": 1})).unwrap();
/// assert!(matches!(rules, ValidationRules::Number(_)));
/// ```
pub(super) fn json_to_validation_rules(
    field_type: FieldType,
    value: &Value,
) -> Result<ValidationRules, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "validation rules: expected JSON object".to_owned())?;
    ValidationRules::parse(field_type, object)
        .map_err(|problems| format!("validation rules: {}", problems.join("; ")))
}

/// Decode a submission payload, which is always a JSON object.
pub(super) fn json_to_payload(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!(
            "submission payload: expected JSON object, found {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for JSON decode helpers.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn field_options_round_trip_through_json() {
        let options = vec![
            FieldOption::plain("worn"),
            FieldOption {
                value: "ok".into(),
                label: "Serviceable".into(),
            },
        ];
        let decoded =
            json_to_field_options(field_options_to_json(&options)).expect("decode should succeed");
        assert_eq!(decoded, options);
    }

    #[rstest]
    fn field_options_reject_missing_label() {
        let err = json_to_field_options(json!([{ "value": "a" }])).expect_err("label required");
        assert!(err.contains("field options decode"), "unexpected error: {err}");
    }

    #[rstest]
    fn validation_rules_are_reparsed_for_their_field_type() {
        let rules = json_to_validation_rules(FieldType::Text, &json!({"pattern": "^[A-Z]+$"}))
            .expect("decode should succeed");
        let ValidationRules::Text(text) = rules else {
            panic!("expected text rules, got {rules:?}");
        };
        assert!(text.pattern.expect("pattern").is_match("ABC"));
    }

    #[rstest]
    #[case::wrong_type(json!({"pattern": "x"}), FieldType::Number)]
    #[case::not_an_object(json!([1, 2]), FieldType::Text)]
    fn invalid_validation_rules_are_reported(#[case] value: Value, #[case] field_type: FieldType) {
        let err = json_to_validation_rules(field_type, &value).expect_err("should fail");
        assert!(err.starts_with("validation rules"), "unexpected error: {err}");
    }

    #[rstest]
    fn payloads_must_be_objects() {
        let err = json_to_payload(json!("text")).expect_err("string payload");
        assert!(err.contains("found string"), "unexpected error: {err}");
        assert!(json_to_payload(json!({"a": 1})).is_ok());
    }
}
