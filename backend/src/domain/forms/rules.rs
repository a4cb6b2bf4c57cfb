//! Typed validation rules.
//!
//! Rules arrive as an open JSON object and are parsed into the variant that
//! matches the field type. Unknown keys and keys that do not apply to the
//! field type are rejected when the form is defined, never at submit time.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use super::field::FieldType;
use super::values::{parse_date, parse_datetime, parse_time};

/// Regular expression a text value must match in full.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`, anchoring it to the whole value.
    ///
    /// # Errors
    /// Returns the compiler message for invalid expressions.
    pub fn new(source: &str) -> Result<Self, String> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|err| err.to_string())?;
        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    /// Original expression text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Return `true` when the whole of `value` matches.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Length and pattern constraints for free-text style fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

/// Bounds for numeric fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer_only: bool,
}

/// Selection count bounds for checkbox fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceRules {
    pub min_selected: Option<usize>,
    pub max_selected: Option<usize>,
}

/// A bound for date, time, or datetime fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Temporal {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<Utc>),
}

impl Temporal {
    fn to_json(self) -> Value {
        match self {
            Self::Date(date) => json!(date.to_string()),
            Self::Time(time) => json!(time.format("%H:%M:%S").to_string()),
            Self::DateTime(instant) => json!(instant.to_rfc3339()),
        }
    }
}

/// Earliest/latest bounds for temporal fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalRules {
    pub min: Option<Temporal>,
    pub max: Option<Temporal>,
}

/// Extension and size constraints for file references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRules {
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_size_bytes: Option<u64>,
}

/// Validation rules specialised per field type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidationRules {
    /// Select and radio fields, or any field declared without rules.
    #[default]
    None,
    Text(TextRules),
    Number(NumberRules),
    Choice(ChoiceRules),
    Temporal(TemporalRules),
    File(FileRules),
}

impl ValidationRules {
    /// Parse the open rule map for `field_type`, reporting every problem.
    ///
    /// # Errors
    /// Returns one message per rejected key or value.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::forms::{FieldType, ValidationRules};
    /// use serde_json::json;
    ///
    /// let raw = json!({"min": 0, "max": 120});
    /// let rules = ValidationRules::parse(FieldType::Number, raw.as_object().unwrap()).unwrap();
    /// assert!(matches!(rules, ValidationRules::Number(_)));
    ///
    /// let bad = json!({"pattern": "x"});
    /// assert!(ValidationRules::parse(FieldType::Number, bad.as_object().unwrap()).is_err());
    /// ```
    pub fn parse(field_type: FieldType, raw: &Map<String, Value>) -> Result<Self, Vec<String>> {
        let mut problems = Vec::new();
        let rules = match field_type {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Url => parse_text(raw, &mut problems),
            FieldType::Number => parse_number(raw, &mut problems),
            FieldType::Checkbox => parse_choice(raw, &mut problems),
            FieldType::Select | FieldType::Radio => {
                reject_unknown(raw, &[], field_type, &mut problems);
                Self::None
            }
            FieldType::Date | FieldType::Time | FieldType::Datetime => {
                parse_temporal(field_type, raw, &mut problems)
            }
            FieldType::File => parse_file(raw, &mut problems),
        };
        if problems.is_empty() {
            Ok(if raw.is_empty() { Self::None } else { rules })
        } else {
            Err(problems)
        }
    }

    /// Serialise back to the open JSON form accepted by [`Self::parse`].
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::None => {}
            Self::Text(rules) => {
                insert_opt(&mut map, "min_length", rules.min_length.map(|v| json!(v)));
                insert_opt(&mut map, "max_length", rules.max_length.map(|v| json!(v)));
                insert_opt(
                    &mut map,
                    "pattern",
                    rules.pattern.as_ref().map(|p| json!(p.source())),
                );
            }
            Self::Number(rules) => {
                insert_opt(&mut map, "min", rules.min.map(|v| json!(v)));
                insert_opt(&mut map, "max", rules.max.map(|v| json!(v)));
                if rules.integer_only {
                    map.insert("integer".to_owned(), Value::Bool(true));
                }
            }
            Self::Choice(rules) => {
                insert_opt(&mut map, "min_selected", rules.min_selected.map(|v| json!(v)));
                insert_opt(&mut map, "max_selected", rules.max_selected.map(|v| json!(v)));
            }
            Self::Temporal(rules) => {
                insert_opt(&mut map, "min", rules.min.map(Temporal::to_json));
                insert_opt(&mut map, "max", rules.max.map(Temporal::to_json));
            }
            Self::File(rules) => {
                if !rules.allowed_extensions.is_empty() {
                    map.insert(
                        "allowed_extensions".to_owned(),
                        json!(rules.allowed_extensions),
                    );
                }
                insert_opt(&mut map, "max_size", rules.max_size_bytes.map(|v| json!(v)));
            }
        }
        Value::Object(map)
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_owned(), value);
    }
}

fn reject_unknown(
    raw: &Map<String, Value>,
    allowed: &[&str],
    field_type: FieldType,
    problems: &mut Vec<String>,
) {
    for key in raw.keys() {
        if !allowed.contains(&key.as_str()) {
            problems.push(format!(
                "Rule \"{key}\" is not supported for {field_type} fields."
            ));
        }
    }
}

fn count(raw: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Option<usize> {
    let value = raw.get(key)?;
    match value.as_u64().and_then(|n| usize::try_from(n).ok()) {
        Some(n) => Some(n),
        None => {
            problems.push(format!("Rule \"{key}\" must be a non-negative integer."));
            None
        }
    }
}

fn number(raw: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Option<f64> {
    let value = raw.get(key)?;
    match value.as_f64() {
        Some(n) => Some(n),
        None => {
            problems.push(format!("Rule \"{key}\" must be a number."));
            None
        }
    }
}

fn check_bounds<T: PartialOrd>(
    min: Option<&T>,
    max: Option<&T>,
    keys: (&str, &str),
    problems: &mut Vec<String>,
) {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        problems.push(format!(
            "Rule \"{}\" must not exceed \"{}\".",
            keys.0, keys.1
        ));
    }
}

fn parse_text(raw: &Map<String, Value>, problems: &mut Vec<String>) -> ValidationRules {
    reject_unknown(raw, &["min_length", "max_length", "pattern"], FieldType::Text, problems);
    let min_length = count(raw, "min_length", problems);
    let max_length = count(raw, "max_length", problems);
    check_bounds(
        min_length.as_ref(),
        max_length.as_ref(),
        ("min_length", "max_length"),
        problems,
    );
    let pattern = match raw.get("pattern") {
        None => None,
        Some(Value::String(source)) => match Pattern::new(source) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                problems.push(format!("Rule \"pattern\" is not a valid expression: {err}"));
                None
            }
        },
        Some(_) => {
            problems.push("Rule \"pattern\" must be a string.".to_owned());
            None
        }
    };
    ValidationRules::Text(TextRules {
        min_length,
        max_length,
        pattern,
    })
}

fn parse_number(raw: &Map<String, Value>, problems: &mut Vec<String>) -> ValidationRules {
    reject_unknown(raw, &["min", "max", "integer"], FieldType::Number, problems);
    let min = number(raw, "min", problems);
    let max = number(raw, "max", problems);
    check_bounds(min.as_ref(), max.as_ref(), ("min", "max"), problems);
    let integer_only = match raw.get("integer") {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            problems.push("Rule \"integer\" must be a boolean.".to_owned());
            false
        }
    };
    ValidationRules::Number(NumberRules {
        min,
        max,
        integer_only,
    })
}

fn parse_choice(raw: &Map<String, Value>, problems: &mut Vec<String>) -> ValidationRules {
    reject_unknown(raw, &["min_selected", "max_selected"], FieldType::Checkbox, problems);
    let min_selected = count(raw, "min_selected", problems);
    let max_selected = count(raw, "max_selected", problems);
    check_bounds(
        min_selected.as_ref(),
        max_selected.as_ref(),
        ("min_selected", "max_selected"),
        problems,
    );
    ValidationRules::Choice(ChoiceRules {
        min_selected,
        max_selected,
    })
}

fn parse_temporal(
    field_type: FieldType,
    raw: &Map<String, Value>,
    problems: &mut Vec<String>,
) -> ValidationRules {
    reject_unknown(raw, &["min", "max"], field_type, problems);
    let mut bound = |key: &str| -> Option<Temporal> {
        let value = raw.get(key)?;
        let parsed = value.as_str().and_then(|text| match field_type {
            FieldType::Date => parse_date(text).map(Temporal::Date),
            FieldType::Time => parse_time(text).map(Temporal::Time),
            _ => parse_datetime(text).map(Temporal::DateTime),
        });
        if parsed.is_none() {
            problems.push(format!(
                "Rule \"{key}\" must be a valid {field_type} value."
            ));
        }
        parsed
    };
    let min = bound("min");
    let max = bound("max");
    check_bounds(min.as_ref(), max.as_ref(), ("min", "max"), problems);
    ValidationRules::Temporal(TemporalRules { min, max })
}

fn parse_file(raw: &Map<String, Value>, problems: &mut Vec<String>) -> ValidationRules {
    reject_unknown(raw, &["allowed_extensions", "max_size"], FieldType::File, problems);
    let allowed_extensions = match raw.get("allowed_extensions") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let parsed: Option<Vec<String>> = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                })
                .collect();
            parsed.unwrap_or_else(|| {
                problems.push("Rule \"allowed_extensions\" must list strings.".to_owned());
                Vec::new()
            })
        }
        Some(_) => {
            problems.push("Rule \"allowed_extensions\" must list strings.".to_owned());
            Vec::new()
        }
    };
    let max_size_bytes = raw.get("max_size").and_then(|value| {
        let parsed = value.as_u64();
        if parsed.is_none() {
            problems.push("Rule \"max_size\" must be a non-negative integer.".to_owned());
        }
        parsed
    });
    ValidationRules::File(FileRules {
        allowed_extensions,
        max_size_bytes,
    })
}
