//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    bogie_checksheets, form_fields, forms, refresh_tokens, submissions, users,
    wheel_specifications,
};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading account columns, without the password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub phone_number: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub employee_id: Option<String>,
    pub department: String,
    pub position: String,
    pub manager_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Insertable struct for creating accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub phone_number: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub bio: &'a str,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: &'a str,
    pub address_line_2: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
    pub employee_id: Option<&'a str>,
    pub department: &'a str,
    pub position: &'a str,
    pub manager_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the contact, profile, and employment columns.
///
/// `treat_none_as_null` lets an update clear optional columns such as the
/// manager or email. Account flags live in [`UserFlagsUpdate`].
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub phone_number: &'a str,
    pub email: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub bio: &'a str,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: &'a str,
    pub address_line_2: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
    pub employee_id: Option<&'a str>,
    pub department: &'a str,
    pub position: &'a str,
    pub manager_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// Targeted account flag changeset; `None` columns are left out of the SET.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserFlagsUpdate {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Refresh token models
// ---------------------------------------------------------------------------

/// Insertable struct for issued refresh tokens.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub(crate) struct NewRefreshTokenRow {
    pub jti: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Form models
// ---------------------------------------------------------------------------

/// Row struct for reading from the forms table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = forms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FormRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub form_type: String,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating form records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = forms)]
pub(crate) struct NewFormRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub form_type: &'a str,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the form_fields table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = form_fields)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FormFieldRow {
    pub form_id: Uuid,
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    pub display_order: i32,
    pub position: i32,
    pub options: serde_json::Value,
    pub validation_rules: serde_json::Value,
}

/// Insertable struct for form fields.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = form_fields)]
pub(crate) struct NewFormFieldRow<'a> {
    pub form_id: Uuid,
    pub name: &'a str,
    pub label: &'a str,
    pub field_type: &'a str,
    pub placeholder: &'a str,
    pub help_text: &'a str,
    pub required: bool,
    pub display_order: i32,
    pub position: i32,
    pub options: serde_json::Value,
    pub validation_rules: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Submission models
// ---------------------------------------------------------------------------

/// Row struct for reading from the submissions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubmissionRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub submitted_by: Uuid,
    pub payload: serde_json::Value,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: String,
}

/// Insertable struct for new submissions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = submissions)]
pub(crate) struct NewSubmissionRow<'a> {
    pub id: Uuid,
    pub form_id: Uuid,
    pub submitted_by: Uuid,
    pub payload: serde_json::Value,
    pub status: &'a str,
    pub submitted_at: DateTime<Utc>,
}

/// Changeset applied when a reviewer moves a submission.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = submissions)]
pub(crate) struct SubmissionReviewUpdate<'a> {
    pub status: &'a str,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: &'a str,
}

// ---------------------------------------------------------------------------
// Maintenance record models
// ---------------------------------------------------------------------------

/// Row struct for reading from the wheel_specifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wheel_specifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WheelSpecificationRow {
    pub form_number: String,
    pub submitted_by: Uuid,
    pub submitted_date: NaiveDate,
    pub status: String,
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for wheel specifications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wheel_specifications)]
pub(crate) struct NewWheelSpecificationRow<'a> {
    pub form_number: &'a str,
    pub submitted_by: Uuid,
    pub submitted_date: NaiveDate,
    pub status: &'a str,
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the bogie_checksheets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bogie_checksheets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BogieChecksheetRow {
    pub form_number: String,
    pub inspection_by: Uuid,
    pub inspection_date: NaiveDate,
    pub status: String,
    pub bogie_details: serde_json::Value,
    pub bogie_checksheet: serde_json::Value,
    pub bmbc_checksheet: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for bogie checksheets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bogie_checksheets)]
pub(crate) struct NewBogieChecksheetRow<'a> {
    pub form_number: &'a str,
    pub inspection_by: Uuid,
    pub inspection_date: NaiveDate,
    pub status: &'a str,
    pub bogie_no: &'a str,
    pub bogie_details: serde_json::Value,
    pub bogie_checksheet: serde_json::Value,
    pub bmbc_checksheet: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
