//! Request and response bodies for dynamic forms and their submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    FieldDefinition, FieldDraft, FieldOption, FieldType, Form, FormDraft, FormId, FormType,
    Review, Submission, SubmissionId, SubmissionStatus, UserId,
};

/// A choice offered by select, radio, and checkbox fields.
///
/// Plain strings are accepted and used as both value and label.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FieldOptionInput {
    Plain(String),
    Labelled { value: String, label: String },
}

impl From<FieldOptionInput> for FieldOption {
    fn from(value: FieldOptionInput) -> Self {
        match value {
            FieldOptionInput::Plain(value) => Self::plain(value),
            FieldOptionInput::Labelled { value, label } => Self { value, label },
        }
    }
}

/// One field of a form definition request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct FieldDraftRequest {
    /// Payload key; derived from the label when omitted.
    pub name: Option<String>,
    #[schema(example = "Wheel diameter")]
    pub label: String,
    #[schema(example = "number")]
    pub field_type: String,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    pub order: Option<i32>,
    pub options: Vec<FieldOptionInput>,
    #[schema(value_type = Object, example = json!({ "min": 800, "max": 1000 }))]
    pub validation_rules: Map<String, Value>,
}

impl From<FieldDraftRequest> for FieldDraft {
    fn from(value: FieldDraftRequest) -> Self {
        Self {
            name: value.name,
            label: value.label,
            field_type: value.field_type,
            placeholder: value.placeholder,
            help_text: value.help_text,
            required: value.required,
            order: value.order,
            options: value.options.into_iter().map(FieldOption::from).collect(),
            validation_rules: value.validation_rules,
        }
    }
}

/// Body of `POST /api/forms/definitions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct FormDraftRequest {
    #[schema(example = "Coach inspection")]
    pub title: String,
    pub description: String,
    #[schema(example = "survey")]
    pub form_type: String,
    pub is_active: bool,
    pub fields: Vec<FieldDraftRequest>,
}

impl Default for FormDraftRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            form_type: String::new(),
            is_active: true,
            fields: Vec::new(),
        }
    }
}

impl From<FormDraftRequest> for FormDraft {
    fn from(value: FormDraftRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            form_type: value.form_type,
            is_active: value.is_active,
            fields: value.fields.into_iter().map(FieldDraft::from).collect(),
        }
    }
}

/// Query string of `GET /api/forms/definitions`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct FormListQuery {
    /// Staff only: also list deactivated forms.
    pub include_inactive: bool,
}

/// Body of `PUT /api/forms/definitions/{id}/active`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FormActivationRequest {
    pub is_active: bool,
}

/// Body of `PUT /api/forms/submissions/{id}/status`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ReviewSubmissionRequest {
    #[schema(example = "reviewed")]
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldOptionResponse {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldResponse {
    pub name: String,
    pub label: String,
    #[schema(value_type = String, example = "number")]
    pub field_type: FieldType,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    pub order: i32,
    pub options: Vec<FieldOptionResponse>,
    #[schema(value_type = Object)]
    pub validation_rules: Value,
}

impl From<FieldDefinition> for FieldResponse {
    fn from(field: FieldDefinition) -> Self {
        let validation_rules = field.rules.to_json();
        Self {
            name: field.name,
            label: field.label,
            field_type: field.field_type,
            placeholder: field.placeholder,
            help_text: field.help_text,
            required: field.required,
            order: field.order,
            options: field
                .options
                .into_iter()
                .map(|option| FieldOptionResponse {
                    value: option.value,
                    label: option.label,
                })
                .collect(),
            validation_rules,
        }
    }
}

/// Form definition as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: FormId,
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "survey")]
    pub form_type: FormType,
    pub is_active: bool,
    #[schema(value_type = String, format = Uuid)]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Vec<FieldResponse>,
}

impl From<Form> for FormResponse {
    fn from(form: Form) -> Self {
        Self {
            id: form.id,
            title: form.title,
            description: form.description,
            form_type: form.form_type,
            is_active: form.is_active,
            created_by: form.created_by,
            created_at: form.created_at,
            updated_at: form.updated_at,
            fields: form.fields.into_iter().map(FieldResponse::from).collect(),
        }
    }
}

/// Submission as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: SubmissionId,
    #[schema(value_type = String, format = Uuid)]
    pub form_id: FormId,
    #[schema(value_type = String, format = Uuid)]
    pub submitted_by: UserId,
    #[schema(value_type = Object)]
    pub data: Map<String, Value>,
    #[schema(value_type = String, example = "pending")]
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        let (reviewed_by, reviewed_at, review_notes) = match submission.review {
            Some(Review {
                reviewer,
                reviewed_at,
                notes,
            }) => (Some(reviewer), Some(reviewed_at), notes),
            None => (None, None, String::new()),
        };
        Self {
            id: submission.id,
            form_id: submission.form_id,
            submitted_by: submission.submitted_by,
            data: submission.payload,
            status: submission.status,
            submitted_at: submission.submitted_at,
            reviewed_by,
            reviewed_at,
            review_notes,
        }
    }
}
