//! Payload validation against a form's field definitions.
//!
//! Each field type owns one validator function; [`VALIDATORS`] dispatches on
//! [`FieldType::index`](super::FieldType::index). Validation walks fields in
//! display order and collects every violation before reporting.

use serde_json::{Map, Value};
use url::Url;

use super::field::FieldDefinition;
use super::rules::{
    ChoiceRules, FileRules, NumberRules, Temporal, TemporalRules, TextRules, ValidationRules,
};
use super::values::{parse_date, parse_datetime, parse_time};
use crate::domain::field_errors::FieldErrors;
use crate::domain::user::{EmailAddress, PhoneNumber};

pub const REQUIRED: &str = "This field is required.";
pub const UNKNOWN_FIELD: &str = "Unknown field.";

type Validator = fn(&FieldDefinition, &Value) -> Result<(), String>;

/// Validator per field type, ordered as [`FieldType::ALL`](super::FieldType::ALL).
static VALIDATORS: [Validator; 13] = [
    validate_text,
    validate_email,
    validate_number,
    validate_phone,
    validate_url,
    validate_text,
    validate_single_choice,
    validate_single_choice,
    validate_checkbox,
    validate_date,
    validate_time,
    validate_datetime,
    validate_file,
];

/// Return `true` when a value counts as absent for `required` checks.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Validate a single value for `field`.
///
/// # Errors
/// Returns the first message describing why the value is unacceptable.
pub fn validate_value(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    VALIDATORS[field.field_type.index()](field, value)
}

/// Validate a whole payload against `fields`, which must already be sorted
/// in display order.
///
/// Blank optional values are accepted without type checks. Keys that name
/// no field are reported after all field errors.
///
/// # Errors
/// Returns every violation keyed by field name.
///
/// # Examples
/// ```
/// use kpa_backend::domain::forms::{FieldDefinition, FieldType, ValidationRules, validate_payload};
/// use serde_json::{Map, json};
///
/// let field = |name: &str, field_type| FieldDefinition {
///     name: name.into(),
///     label: name.into(),
///     field_type,
///     placeholder: String::new(),
///     help_text: String::new(),
///     required: true,
///     order: 0,
///     options: Vec::new(),
///     rules: ValidationRules::None,
/// };
/// let fields = [field("email", FieldType::Email), field("age", FieldType::Number)];
/// let errors = validate_payload(&fields, &Map::new()).unwrap_err();
/// assert_eq!(errors.fields().collect::<Vec<_>>(), ["email", "age"]);
/// ```
pub fn validate_payload(
    fields: &[FieldDefinition],
    payload: &Map<String, Value>,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for field in fields {
        match payload.get(&field.name) {
            Some(value) if !is_blank(value) => {
                if let Err(message) = validate_value(field, value) {
                    errors.push(field.name.as_str(), message);
                }
            }
            _ if field.required => errors.push(field.name.as_str(), REQUIRED),
            _ => {}
        }
    }
    for key in payload.keys() {
        if !fields.iter().any(|field| &field.name == key) {
            errors.push(key.as_str(), UNKNOWN_FIELD);
        }
    }
    errors.into_result(())
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .map(str::trim)
        .ok_or_else(|| "Enter a text value.".to_owned())
}

fn text_rules(field: &FieldDefinition) -> Option<&TextRules> {
    match &field.rules {
        ValidationRules::Text(rules) => Some(rules),
        _ => None,
    }
}

fn check_text_rules(field: &FieldDefinition, text: &str) -> Result<(), String> {
    let Some(rules) = text_rules(field) else {
        return Ok(());
    };
    let length = text.chars().count();
    if let Some(min) = rules.min_length
        && length < min
    {
        return Err(format!(
            "Ensure this field has at least {min} characters."
        ));
    }
    if let Some(max) = rules.max_length
        && length > max
    {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    if let Some(pattern) = &rules.pattern
        && !pattern.is_match(text)
    {
        return Err("Enter a value in the required format.".to_owned());
    }
    Ok(())
}

fn validate_text(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let text = expect_str(value)?;
    check_text_rules(field, text)
}

fn validate_email(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let text = expect_str(value)?;
    EmailAddress::new(text).map_err(|err| err.to_string())?;
    check_text_rules(field, text)
}

fn validate_phone(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let text = expect_str(value)?;
    PhoneNumber::new(text).map_err(|err| err.to_string())?;
    check_text_rules(field, text)
}

fn validate_url(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let text = expect_str(value)?;
    let parsed = Url::parse(text).map_err(|_| "Enter a valid URL.".to_owned())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err("Enter a valid URL.".to_owned());
    }
    check_text_rules(field, text)
}

fn validate_number(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
    .ok_or_else(|| "Enter a number.".to_owned())?;
    let ValidationRules::Number(NumberRules {
        min,
        max,
        integer_only,
    }) = &field.rules
    else {
        return Ok(());
    };
    if *integer_only && number.fract() != 0.0 {
        return Err("Enter a whole number.".to_owned());
    }
    if let Some(min) = min
        && number < *min
    {
        return Err(format!(
            "Ensure this value is greater than or equal to {min}."
        ));
    }
    if let Some(max) = max
        && number > *max
    {
        return Err(format!("Ensure this value is less than or equal to {max}."));
    }
    Ok(())
}

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

fn validate_single_choice(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let choice = expect_str(value)?;
    if field.has_option(choice) {
        Ok(())
    } else {
        Err(invalid_choice(choice))
    }
}

fn validate_checkbox(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let selected: Vec<&str> = match value {
        Value::String(single) => vec![single.trim()],
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::trim))
            .collect::<Option<_>>()
            .ok_or_else(|| "Enter a list of values.".to_owned())?,
        _ => return Err("Enter a list of values.".to_owned()),
    };
    if let Some(unknown) = selected.iter().find(|choice| !field.has_option(choice)) {
        return Err(invalid_choice(unknown));
    }
    if let ValidationRules::Choice(ChoiceRules {
        min_selected,
        max_selected,
    }) = &field.rules
    {
        if let Some(min) = min_selected
            && selected.len() < *min
        {
            return Err(format!("Select at least {min} choices."));
        }
        if let Some(max) = max_selected
            && selected.len() > *max
        {
            return Err(format!("Select no more than {max} choices."));
        }
    }
    Ok(())
}

fn check_temporal(field: &FieldDefinition, value: Temporal) -> Result<(), String> {
    let ValidationRules::Temporal(TemporalRules { min, max }) = &field.rules else {
        return Ok(());
    };
    if let Some(min) = min
        && value < *min
    {
        return Err("Ensure this value is not earlier than the allowed minimum.".to_owned());
    }
    if let Some(max) = max
        && value > *max
    {
        return Err("Ensure this value is not later than the allowed maximum.".to_owned());
    }
    Ok(())
}

fn validate_date(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let date = expect_str(value)
        .ok()
        .and_then(parse_date)
        .ok_or_else(|| "Enter a valid date.".to_owned())?;
    check_temporal(field, Temporal::Date(date))
}

fn validate_time(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let time = expect_str(value)
        .ok()
        .and_then(parse_time)
        .ok_or_else(|| "Enter a valid time.".to_owned())?;
    check_temporal(field, Temporal::Time(time))
}

fn validate_datetime(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let instant = expect_str(value)
        .ok()
        .and_then(parse_datetime)
        .ok_or_else(|| "Enter a valid date/time.".to_owned())?;
    check_temporal(field, Temporal::DateTime(instant))
}

fn file_reference(value: &Value) -> Option<(&str, Option<u64>)> {
    let reference = match value {
        Value::String(name) => Some((name.trim(), None)),
        Value::Object(map) => {
            let name = map.get("name")?.as_str()?.trim();
            let size = match map.get("size") {
                None | Some(Value::Null) => None,
                Some(size) => Some(size.as_u64()?),
            };
            Some((name, size))
        }
        _ => None,
    };
    reference.filter(|(name, _)| !name.is_empty())
}

fn validate_file(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    let (name, size) =
        file_reference(value).ok_or_else(|| "Submit a file reference.".to_owned())?;
    let ValidationRules::File(FileRules {
        allowed_extensions,
        max_size_bytes,
    }) = &field.rules
    else {
        return Ok(());
    };
    if !allowed_extensions.is_empty() {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !allowed_extensions.contains(&extension) {
            return Err(format!(
                "File extension \"{extension}\" is not allowed. Allowed extensions are: {}.",
                allowed_extensions.join(", ")
            ));
        }
    }
    if let (Some(limit), Some(size)) = (max_size_bytes, size)
        && size > *limit
    {
        return Err(format!("Ensure this file is no larger than {limit} bytes."));
    }
    Ok(())
}

/// Map a JSON object into a payload map, rejecting non-object bodies.
///
/// # Errors
/// Returns a `payload` field error when `value` is not an object.
pub fn payload_object(value: Value) -> Result<Map<String, Value>, FieldErrors> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(FieldErrors::single("payload", "Expected a JSON object.")),
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
