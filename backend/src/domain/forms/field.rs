//! Field definitions for dynamic forms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rules::ValidationRules;

/// The thirteen supported input kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    #[serde(alias = "tel")]
    Phone,
    Url,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Time,
    Datetime,
    File,
}

impl FieldType {
    /// Every field type in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Text,
        Self::Email,
        Self::Number,
        Self::Phone,
        Self::Url,
        Self::Textarea,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::Date,
        Self::Time,
        Self::Datetime,
        Self::File,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::File => "file",
        }
    }

    /// Choice types draw their values from a declared option list.
    #[must_use]
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    /// Position of the type in [`FieldType::ALL`]; used to index lookup
    /// tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a field type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "tel" {
            return Ok(Self::Phone);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownFieldType(s.to_owned()))
    }
}

/// One selectable value of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    /// Option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    /// Strip surrounding whitespace from value and label; submitted choices
    /// are compared trimmed.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            value: self.value.trim().to_owned(),
            label: self.label.trim().to_owned(),
        }
    }
}

/// Validated field belonging to a form.
///
/// ## Invariants
/// - `name` is a non-empty slug unique within its form; payload keys refer
///   to it.
/// - Choice types carry at least one option and option values are unique.
/// - `rules` is the variant matching `field_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    pub order: i32,
    pub options: Vec<FieldOption>,
    pub rules: ValidationRules,
}

impl FieldDefinition {
    /// Return `true` when `value` is one of the declared option values.
    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

/// Derive a payload key from a label: lowercase ASCII alphanumerics joined
/// by single underscores.
///
/// # Examples
/// ```
/// use kpa_backend::domain::forms::slugify;
///
/// assert_eq!(slugify("Wheel Gauge (mm)"), "wheel_gauge_mm");
/// assert_eq!(slugify("  E-mail  "), "e_mail");
/// ```
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Return `true` when `name` is usable as a payload key.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 100
        && name
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
