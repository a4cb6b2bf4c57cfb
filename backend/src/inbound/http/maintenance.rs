//! Maintenance record handlers.
//!
//! ```text
//! POST /api/forms/wheel-specifications {"formNumber":"WS-2024-001",…}
//! GET /api/forms/wheel-specifications?form_number=WS&status=submitted
//! POST /api/forms/bogie-checksheets {"formNumber":"BOGIE-2024-001",…}
//! PUT /api/forms/bogie-checksheets/BOGIE-2024-001/status {"status":"reviewed"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};

use crate::domain::{
    BogieChecksheetDraft, Error, FormNumber, RecordStatus, WheelSpecificationDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedActor;
use crate::inbound::http::envelope::{self, Envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

pub use super::maintenance_dto::{
    BogieChecksheetQuery, BogieChecksheetResponse, RecordStatusRequest,
    WheelSpecificationQuery, WheelSpecificationResponse,
};

fn created_message(kind: &str, status: RecordStatus) -> String {
    match status {
        RecordStatus::Saved => format!("{kind} saved as draft"),
        _ => format!("{kind} submitted successfully"),
    }
}

fn list_message(plural: &str, filtered: bool) -> String {
    if filtered {
        format!("Filtered {plural} retrieved successfully")
    } else {
        format!("All {plural} retrieved successfully")
    }
}

fn path_form_number(raw: &str) -> Result<FormNumber, Error> {
    FormNumber::new(raw).map_err(|_| Error::not_found("Record not found"))
}

fn status_from(payload: &RecordStatusRequest) -> Result<RecordStatus, Error> {
    payload.parse().map_err(Error::validation)
}

/// Create a wheel specification. The form number must be unused.
#[utoipa::path(
    post,
    path = "/api/forms/wheel-specifications",
    request_body = WheelSpecificationDraft,
    responses(
        (status = 201, description = "Wheel specification stored", body = Envelope<WheelSpecificationResponse>),
        (status = 400, description = "Invalid record", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Form number already in use", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "createWheelSpecification"
)]
#[post("/wheel-specifications")]
pub async fn create_wheel_specification(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<WheelSpecificationDraft>,
) -> ApiResult<HttpResponse> {
    let record = state
        .maintenance
        .create_wheel_specification(caller.actor(), payload.into_inner())
        .await?;
    Ok(envelope::created(
        created_message("Wheel specification", record.status),
        WheelSpecificationResponse::from(record),
    ))
}

/// List wheel specifications matching every supplied filter.
#[utoipa::path(
    get,
    path = "/api/forms/wheel-specifications",
    params(WheelSpecificationQuery),
    responses(
        (status = 200, description = "Wheel specifications", body = Envelope<Vec<WheelSpecificationResponse>>),
        (status = 400, description = "Malformed filter value", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "listWheelSpecifications"
)]
#[get("/wheel-specifications")]
pub async fn list_wheel_specifications(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    query: web::Query<WheelSpecificationQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.into_inner().into_filter().map_err(Error::validation)?;
    let filtered = !filter.is_empty();
    let records = state
        .maintenance
        .list_wheel_specifications(caller.actor(), filter)
        .await?;
    let data: Vec<WheelSpecificationResponse> = records
        .into_iter()
        .map(WheelSpecificationResponse::from)
        .collect();
    Ok(envelope::ok(
        list_message("wheel specifications", filtered),
        data,
    ))
}

/// Advance a wheel specification through its workflow. Staff only.
#[utoipa::path(
    put,
    path = "/api/forms/wheel-specifications/{form_number}/status",
    params(("form_number" = String, Path, description = "Form number")),
    request_body = RecordStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Envelope<WheelSpecificationResponse>),
        (status = 400, description = "Invalid status or transition", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Record changed concurrently", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "setWheelSpecificationStatus"
)]
#[put("/wheel-specifications/{form_number}/status")]
pub async fn set_wheel_specification_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    form_number: web::Path<String>,
    payload: web::Json<RecordStatusRequest>,
) -> ApiResult<HttpResponse> {
    let form_number = path_form_number(&form_number)?;
    let status = status_from(&payload)?;
    let record = state
        .maintenance
        .set_wheel_specification_status(caller.actor(), form_number, status)
        .await?;
    Ok(envelope::ok(
        format!("Wheel specification marked as {status}"),
        WheelSpecificationResponse::from(record),
    ))
}

/// Create a bogie checksheet. The form number must be unused.
#[utoipa::path(
    post,
    path = "/api/forms/bogie-checksheets",
    request_body = BogieChecksheetDraft,
    responses(
        (status = 201, description = "Bogie checksheet stored", body = Envelope<BogieChecksheetResponse>),
        (status = 400, description = "Invalid record", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Form number already in use", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "createBogieChecksheet"
)]
#[post("/bogie-checksheets")]
pub async fn create_bogie_checksheet(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<BogieChecksheetDraft>,
) -> ApiResult<HttpResponse> {
    store_bogie_checksheet(&state, &caller, payload.into_inner()).await
}

/// Singular alias of `POST /api/forms/bogie-checksheets`.
#[utoipa::path(
    post,
    path = "/api/forms/bogie-checksheet",
    request_body = BogieChecksheetDraft,
    responses(
        (status = 201, description = "Bogie checksheet stored", body = Envelope<BogieChecksheetResponse>),
        (status = 400, description = "Invalid record", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Form number already in use", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "createBogieChecksheetAlias"
)]
#[post("/bogie-checksheet")]
pub async fn create_bogie_checksheet_alias(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<BogieChecksheetDraft>,
) -> ApiResult<HttpResponse> {
    store_bogie_checksheet(&state, &caller, payload.into_inner()).await
}

async fn store_bogie_checksheet(
    state: &HttpState,
    caller: &AuthenticatedActor,
    draft: BogieChecksheetDraft,
) -> ApiResult<HttpResponse> {
    let record = state
        .maintenance
        .create_bogie_checksheet(caller.actor(), draft)
        .await?;
    Ok(envelope::created(
        created_message("Bogie checksheet", record.status),
        BogieChecksheetResponse::from(record),
    ))
}

/// List bogie checksheets matching every supplied filter.
#[utoipa::path(
    get,
    path = "/api/forms/bogie-checksheets",
    params(BogieChecksheetQuery),
    responses(
        (status = 200, description = "Bogie checksheets", body = Envelope<Vec<BogieChecksheetResponse>>),
        (status = 400, description = "Malformed filter value", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "listBogieChecksheets"
)]
#[get("/bogie-checksheets")]
pub async fn list_bogie_checksheets(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    query: web::Query<BogieChecksheetQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.into_inner().into_filter().map_err(Error::validation)?;
    let filtered = !filter.is_empty();
    let records = state
        .maintenance
        .list_bogie_checksheets(caller.actor(), filter)
        .await?;
    let data: Vec<BogieChecksheetResponse> = records
        .into_iter()
        .map(BogieChecksheetResponse::from)
        .collect();
    Ok(envelope::ok(list_message("bogie checksheets", filtered), data))
}

/// Advance a bogie checksheet through its workflow. Staff only.
#[utoipa::path(
    put,
    path = "/api/forms/bogie-checksheets/{form_number}/status",
    params(("form_number" = String, Path, description = "Form number")),
    request_body = RecordStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Envelope<BogieChecksheetResponse>),
        (status = 400, description = "Invalid status or transition", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Record changed concurrently", body = ErrorSchema)
    ),
    tags = ["maintenance"],
    operation_id = "setBogieChecksheetStatus"
)]
#[put("/bogie-checksheets/{form_number}/status")]
pub async fn set_bogie_checksheet_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    form_number: web::Path<String>,
    payload: web::Json<RecordStatusRequest>,
) -> ApiResult<HttpResponse> {
    let form_number = path_form_number(&form_number)?;
    let status = status_from(&payload)?;
    let record = state
        .maintenance
        .set_bogie_checksheet_status(caller.actor(), form_number, status)
        .await?;
    Ok(envelope::ok(
        format!("Bogie checksheet marked as {status}"),
        BogieChecksheetResponse::from(record),
    ))
}

/// Attach the maintenance record routes to `scope`.
pub fn routes(scope: actix_web::Scope) -> actix_web::Scope {
    scope
        .service(create_wheel_specification)
        .service(list_wheel_specifications)
        .service(set_wheel_specification_status)
        .service(create_bogie_checksheet)
        .service(create_bogie_checksheet_alias)
        .service(list_bogie_checksheets)
        .service(set_bogie_checksheet_status)
}
