//! Dynamic form definitions.
//!
//! A form owns an ordered list of typed fields. Drafts arrive as loosely
//! typed input and are validated into [`FormDefinitionInput`] in one pass,
//! collecting every problem under keys such as `fields[2].options`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::field_errors::FieldErrors;
use super::user::{UserId, check_length};

pub mod field;
pub mod rules;
pub mod validation;
pub mod values;

pub use self::field::{
    FieldDefinition, FieldOption, FieldType, UnknownFieldType, is_valid_field_name, slugify,
};
pub use self::rules::{
    ChoiceRules, FileRules, NumberRules, Pattern, Temporal, TemporalRules, TextRules,
    ValidationRules,
};
pub use self::validation::{is_blank, payload_object, validate_payload, validate_value};

/// Maximum number of fields on one form.
pub const MAX_FORM_FIELDS: usize = 50;
/// Maximum number of options on one choice field.
pub const MAX_FIELD_OPTIONS: usize = 100;
/// Maximum serialised size of a submission payload.
pub const MAX_SUBMISSION_BYTES: usize = 10 * 1024 * 1024;
/// Maximum length of form titles and field labels.
pub const TITLE_MAX: usize = 200;
/// Maximum length of placeholders and option labels.
pub const SHORT_TEXT_MAX: usize = 200;

/// Identifier of a form definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(Uuid);

impl FormId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Broad purpose of a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Contact,
    Feedback,
    Survey,
    Application,
    #[default]
    Other,
}

impl FormType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Feedback => "feedback",
            Self::Survey => "survey",
            Self::Application => "application",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contact" => Ok(Self::Contact),
            "feedback" => Ok(Self::Feedback),
            "survey" => Ok(Self::Survey),
            "application" => Ok(Self::Application),
            "other" | "" => Ok(Self::Other),
            _ => Err(format!("\"{s}\" is not a valid choice.")),
        }
    }
}

/// Stored form definition.
///
/// ## Invariants
/// - `fields` is non-empty, sorted by `order`, and field names are unique.
/// - Only active forms accept new submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub id: FormId,
    pub title: String,
    pub description: String,
    pub form_type: FormType,
    pub is_active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Vec<FieldDefinition>,
}

impl Form {
    /// Find a field by payload key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Unvalidated field input.
#[derive(Debug, Clone, Default)]
pub struct FieldDraft {
    pub name: Option<String>,
    pub label: String,
    pub field_type: String,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    pub order: Option<i32>,
    pub options: Vec<FieldOption>,
    pub validation_rules: Map<String, Value>,
}

/// Unvalidated form input.
#[derive(Debug, Clone, Default)]
pub struct FormDraft {
    pub title: String,
    pub description: String,
    pub form_type: String,
    pub is_active: bool,
    pub fields: Vec<FieldDraft>,
}

/// Validated content of a new form, awaiting identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinitionInput {
    pub title: String,
    pub description: String,
    pub form_type: FormType,
    pub is_active: bool,
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinitionInput {
    /// Attach identity and timestamps.
    #[must_use]
    pub fn into_form(self, id: FormId, created_by: UserId, now: DateTime<Utc>) -> Form {
        Form {
            id,
            title: self.title,
            description: self.description,
            form_type: self.form_type,
            is_active: self.is_active,
            created_by,
            created_at: now,
            updated_at: now,
            fields: self.fields,
        }
    }
}

impl TryFrom<FormDraft> for FormDefinitionInput {
    type Error = FieldErrors;

    fn try_from(draft: FormDraft) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            errors.push("title", "This field is required.");
        } else {
            check_length(&mut errors, "title", &title, TITLE_MAX);
        }
        let form_type = draft.form_type.parse::<FormType>().unwrap_or_else(|message| {
            errors.push("form_type", message);
            FormType::Other
        });
        if draft.fields.is_empty() {
            errors.push("fields", "A form needs at least one field.");
        } else if draft.fields.len() > MAX_FORM_FIELDS {
            errors.push(
                "fields",
                format!("Ensure this list has no more than {MAX_FORM_FIELDS} items."),
            );
        }

        let mut names = HashSet::new();
        let mut fields = Vec::with_capacity(draft.fields.len());
        for (index, field) in draft.fields.into_iter().enumerate() {
            let key = format!("fields[{index}]");
            if let Some(definition) = validate_field(&key, index, field, &mut errors)
                && !claim_name(&mut names, &key, &definition.name, &mut errors)
            {
                fields.push((index, definition));
            }
        }
        fields.sort_by_key(|(index, definition)| (definition.order, *index));

        errors.into_result(Self {
            title,
            description: draft.description.trim().to_owned(),
            form_type,
            is_active: draft.is_active,
            fields: fields.into_iter().map(|(_, definition)| definition).collect(),
        })
    }
}

/// Record `name`; returns `true` and reports when it was already taken.
fn claim_name(
    names: &mut HashSet<String>,
    key: &str,
    name: &str,
    errors: &mut FieldErrors,
) -> bool {
    if names.insert(name.to_owned()) {
        false
    } else {
        errors.push(
            format!("{key}.name"),
            format!("Field name \"{name}\" is used more than once."),
        );
        true
    }
}

fn validate_field(
    key: &str,
    index: usize,
    draft: FieldDraft,
    errors: &mut FieldErrors,
) -> Option<FieldDefinition> {
    let before = errors.len();
    let label = draft.label.trim().to_owned();
    if label.is_empty() {
        errors.push(format!("{key}.label"), "This field is required.");
    } else {
        check_length(errors, &format!("{key}.label"), &label, TITLE_MAX);
    }
    check_length(
        errors,
        &format!("{key}.placeholder"),
        &draft.placeholder,
        SHORT_TEXT_MAX,
    );

    let name = draft
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| slugify(&label));
    if !label.is_empty() && !is_valid_field_name(&name) {
        errors.push(
            format!("{key}.name"),
            "Use lowercase letters, digits and underscores only.",
        );
    }

    let field_type = match draft.field_type.parse::<FieldType>() {
        Ok(kind) => Some(kind),
        Err(err) => {
            errors.push(format!("{key}.field_type"), err.to_string());
            None
        }
    };
    let rules = field_type.and_then(|kind| {
        ValidationRules::parse(kind, &draft.validation_rules)
            .map_err(|problems| {
                for problem in problems {
                    errors.push(format!("{key}.validation_rules"), problem);
                }
            })
            .ok()
    });
    let options: Vec<FieldOption> = draft.options.into_iter().map(FieldOption::trimmed).collect();
    if let Some(kind) = field_type {
        check_options(key, kind, &options, errors);
    }

    let order = draft
        .order
        .unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX));
    match (field_type, rules) {
        (Some(field_type), Some(rules)) if errors.len() == before => Some(FieldDefinition {
            name,
            label,
            field_type,
            placeholder: draft.placeholder.trim().to_owned(),
            help_text: draft.help_text.trim().to_owned(),
            required: draft.required,
            order,
            options: if field_type.requires_options() {
                options
            } else {
                Vec::new()
            },
            rules,
        }),
        _ => None,
    }
}

fn check_options(key: &str, kind: FieldType, options: &[FieldOption], errors: &mut FieldErrors) {
    let field = format!("{key}.options");
    if !kind.requires_options() {
        return;
    }
    if options.is_empty() {
        errors.push(field, format!("Options are required for {kind} fields."));
        return;
    }
    if options.len() > MAX_FIELD_OPTIONS {
        errors.push(
            field.as_str(),
            format!("Ensure this list has no more than {MAX_FIELD_OPTIONS} items."),
        );
    }
    let mut seen = HashSet::new();
    for option in options {
        if option.value.is_empty() {
            errors.push(field.as_str(), "Option values must not be blank.");
        } else if !seen.insert(option.value.as_str()) {
            errors.push(
                field.as_str(),
                format!("Option \"{}\" is listed more than once.", option.value),
            );
        }
        check_length(errors, &field, &option.label, SHORT_TEXT_MAX);
    }
}

#[cfg(test)]
mod tests;
