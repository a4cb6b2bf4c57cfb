//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities for accounts, dynamic forms,
//! submissions, and maintenance records, plus the services that implement
//! the driving ports in [`ports`]. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode / FieldErrors — API error payload with per-field
//!   messages.
//! - User and its value types — phone-identified accounts.
//! - Form, FieldDefinition, ValidationRules — dynamic form definitions and
//!   the typed payload validator.
//! - Submission, SubmissionStatus — form responses and their review state.
//! - WheelSpecification, BogieChecksheet, RecordStatus — fixed-schema
//!   maintenance records.
//! - *Service types — use-case implementations over driven ports.

pub mod auth;
pub mod error;
pub mod field_errors;
pub mod forms;
pub mod maintenance;
pub mod pagination;
pub mod ports;
pub mod submission;
pub mod trace_id;
pub mod user;

mod authentication_service;
mod form_catalogue_service;
mod maintenance_record_service;
mod service_support;
mod submission_service;
mod user_directory_service;

pub use self::auth::{
    AccessClaims, Actor, INVALID_CREDENTIALS, INVALID_REFRESH_TOKEN, LoginCredentials,
    LoginValidationError, PASSWORD_MIN_LENGTH, PasswordChange, RefreshClaims, RefreshTokenRecord,
    Registration, RegistrationRequest, TOKEN_TYPE, TokenPair,
};
pub use self::authentication_service::AuthenticationService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::field_errors::FieldErrors;
pub use self::form_catalogue_service::FormCatalogueService;
pub use self::forms::{
    ChoiceRules, FieldDefinition, FieldDraft, FieldOption, FieldType, FileRules, Form,
    FormDefinitionInput, FormDraft, FormId, FormType, MAX_FIELD_OPTIONS, MAX_FORM_FIELDS,
    MAX_SUBMISSION_BYTES, NumberRules, Pattern, Temporal, TemporalRules, TextRules,
    UnknownFieldType, ValidationRules, payload_object, validate_payload,
};
pub use self::maintenance::{
    AxleGuideCondition, BmbcChecksheet, BmbcChecksheetDraft, BmbcCondition, BogieChecksheet,
    BogieChecksheetDraft, BogieChecksheetFilter, BogieConditions, BogieConditionsDraft,
    BogieDetails, BogieDetailsDraft, BracketCondition, ComponentCondition, FORM_NUMBER_TAKEN,
    FormNumber, NewBogieChecksheet, NewWheelSpecification, RecordStatus, USER_NOT_FOUND,
    WheelMeasurements, WheelMeasurementsDraft, WheelSpecification, WheelSpecificationDraft,
    WheelSpecificationFilter,
};
pub use self::maintenance_record_service::MaintenanceRecordService;
pub use self::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use self::submission::{
    InvalidTransition, REVIEW_NOTES_MAX, Review, Submission, SubmissionFilter, SubmissionId,
    SubmissionStatus,
};
pub use self::submission_service::SubmissionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Address, AdminUserUpdate, EmailAddress, EmployeeId, Employment, ManagerChange, NewUser,
    PhoneNumber, ProfileUpdate, User, UserFilter, UserId, UserProfile, UserValidationError,
};
pub use self::user_directory_service::UserDirectoryService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use kpa_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
