//! Dynamic form handlers: definitions, submissions, and reviews.
//!
//! ```text
//! POST /api/forms/definitions {"title":"Coach inspection","fields":[…]}
//! POST /api/forms/definitions/{id}/submissions {"email":"ops@example.com"}
//! PUT /api/forms/submissions/{id}/status {"status":"reviewed","notes":"ok"}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, put, web};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::ReviewRequest;
use crate::domain::{Error, FieldErrors, FormId, SubmissionId, SubmissionStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedActor;
use crate::inbound::http::envelope::{self, Envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

pub use super::forms_dto::{
    FieldDraftRequest, FieldOptionInput, FieldOptionResponse, FieldResponse,
    FormActivationRequest, FormDraftRequest, FormListQuery, FormResponse, ReviewSubmissionRequest,
    SubmissionResponse,
};

/// Define a new form. Staff only.
#[utoipa::path(
    post,
    path = "/api/forms/definitions",
    request_body = FormDraftRequest,
    responses(
        (status = 201, description = "Form created", body = Envelope<FormResponse>),
        (status = 400, description = "Invalid definition", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "createFormDefinition"
)]
#[post("/definitions")]
pub async fn create_definition(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<FormDraftRequest>,
) -> ApiResult<HttpResponse> {
    let form = state
        .forms
        .define(caller.actor(), payload.into_inner().into())
        .await?;
    Ok(envelope::created(
        "Form created successfully",
        FormResponse::from(form),
    ))
}

/// List form definitions, newest first.
#[utoipa::path(
    get,
    path = "/api/forms/definitions",
    params(FormListQuery),
    responses(
        (status = 200, description = "Forms", body = Envelope<Vec<FormResponse>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "listFormDefinitions"
)]
#[get("/definitions")]
pub async fn list_definitions(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    query: web::Query<FormListQuery>,
) -> ApiResult<HttpResponse> {
    let forms = state
        .forms
        .list(caller.actor(), query.include_inactive)
        .await?;
    let data: Vec<FormResponse> = forms.into_iter().map(FormResponse::from).collect();
    Ok(envelope::ok("Forms retrieved successfully", data))
}

/// Fetch one form definition with its fields.
#[utoipa::path(
    get,
    path = "/api/forms/definitions/{id}",
    params(("id" = Uuid, Path, description = "Form identifier")),
    responses(
        (status = 200, description = "Form", body = Envelope<FormResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "getFormDefinition"
)]
#[get("/definitions/{id}")]
pub async fn get_definition(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let form = state
        .forms
        .get(caller.actor(), FormId::from_uuid(id.into_inner()))
        .await?;
    Ok(envelope::ok(
        "Form retrieved successfully",
        FormResponse::from(form),
    ))
}

/// Activate or deactivate a form. Staff only.
#[utoipa::path(
    put,
    path = "/api/forms/definitions/{id}/active",
    params(("id" = Uuid, Path, description = "Form identifier")),
    request_body = FormActivationRequest,
    responses(
        (status = 200, description = "Form updated", body = Envelope<FormResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "setFormActive"
)]
#[put("/definitions/{id}/active")]
pub async fn set_definition_active(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
    payload: web::Json<FormActivationRequest>,
) -> ApiResult<HttpResponse> {
    let is_active = payload.is_active;
    let form = state
        .forms
        .set_active(caller.actor(), FormId::from_uuid(id.into_inner()), is_active)
        .await?;
    let message = if is_active {
        "Form activated successfully"
    } else {
        "Form deactivated successfully"
    };
    Ok(envelope::ok(message, FormResponse::from(form)))
}

/// Submit a payload against an active form.
///
/// The body is the payload object itself, keyed by field name.
#[utoipa::path(
    post,
    path = "/api/forms/definitions/{id}/submissions",
    params(("id" = Uuid, Path, description = "Form identifier")),
    request_body(content = Object, description = "Field values keyed by field name"),
    responses(
        (status = 201, description = "Submission stored", body = Envelope<SubmissionResponse>),
        (status = 400, description = "Payload failed validation or form inactive", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Form not found", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "submitForm"
)]
#[post("/definitions/{id}/submissions")]
pub async fn submit(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let submission = state
        .submissions
        .submit(
            caller.actor(),
            FormId::from_uuid(id.into_inner()),
            payload.into_inner(),
        )
        .await?;
    Ok(envelope::created(
        "Form submitted successfully",
        SubmissionResponse::from(submission),
    ))
}

/// List submissions for a form: every one for staff, the caller's own
/// otherwise.
#[utoipa::path(
    get,
    path = "/api/forms/definitions/{id}/submissions",
    params(("id" = Uuid, Path, description = "Form identifier")),
    responses(
        (status = 200, description = "Submissions", body = Envelope<Vec<SubmissionResponse>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Form not found", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "listFormSubmissions"
)]
#[get("/definitions/{id}/submissions")]
pub async fn list_submissions(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let submissions = state
        .submissions
        .list_for_form(caller.actor(), FormId::from_uuid(id.into_inner()))
        .await?;
    let data: Vec<SubmissionResponse> = submissions
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();
    Ok(envelope::ok("Submissions retrieved successfully", data))
}

/// Fetch one submission. Allowed for its author and staff.
#[utoipa::path(
    get,
    path = "/api/forms/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission identifier")),
    responses(
        (status = 200, description = "Submission", body = Envelope<SubmissionResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "getSubmission"
)]
#[get("/submissions/{id}")]
pub async fn get_submission(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let submission = state
        .submissions
        .get(caller.actor(), SubmissionId::from_uuid(id.into_inner()))
        .await?;
    Ok(envelope::ok(
        "Submission retrieved successfully",
        SubmissionResponse::from(submission),
    ))
}

/// Move a submission one step through its review workflow. Staff only.
#[utoipa::path(
    put,
    path = "/api/forms/submissions/{id}/status",
    params(("id" = Uuid, Path, description = "Submission identifier")),
    request_body = ReviewSubmissionRequest,
    responses(
        (status = 200, description = "Submission reviewed", body = Envelope<SubmissionResponse>),
        (status = 400, description = "Invalid status or transition", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Submission changed concurrently", body = ErrorSchema)
    ),
    tags = ["forms"],
    operation_id = "reviewSubmission"
)]
#[put("/submissions/{id}/status")]
pub async fn review_submission(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
    payload: web::Json<ReviewSubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let ReviewSubmissionRequest { status, notes } = payload.into_inner();
    let status = SubmissionStatus::from_str(&status)
        .map_err(|message| Error::validation(FieldErrors::single("status", message)))?;
    let submission = state
        .submissions
        .review(
            caller.actor(),
            SubmissionId::from_uuid(id.into_inner()),
            ReviewRequest { status, notes },
        )
        .await?;
    Ok(envelope::ok(
        format!("Submission marked as {status}"),
        SubmissionResponse::from(submission),
    ))
}

/// Attach the dynamic form routes to `scope`.
pub fn routes(scope: actix_web::Scope) -> actix_web::Scope {
    scope
        .service(create_definition)
        .service(list_definitions)
        .service(get_definition)
        .service(set_definition_active)
        .service(submit)
        .service(list_submissions)
        .service(get_submission)
        .service(review_submission)
}
