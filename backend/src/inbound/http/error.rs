//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into the uniform
//! `{"success": false, "message", "errors"}` body and matching status codes.
//! Extractor failures (malformed JSON, oversized bodies, bad query strings)
//! are routed through the same body by the handlers in this module.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error};

pub use crate::domain::ApiResult;
use crate::domain::{Error, ErrorCode, FieldErrors, MAX_SUBMISSION_BYTES, TRACE_ID_HEADER};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = %self, "internal error returned to client");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Convert JSON body extraction failures into the uniform error body.
///
/// # Examples
/// ```
/// use actix_web::web;
/// use kpa_backend::inbound::http::error::json_error_handler;
///
/// let config = web::JsonConfig::default().error_handler(json_error_handler);
/// ```
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON body");
    let error = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            Error::invalid_request("Request body too large").with_field_error(
                "payload",
                format!("Payload exceeds the maximum size of {MAX_SUBMISSION_BYTES} bytes."),
            )
        }
        JsonPayloadError::ContentType => {
            Error::invalid_request("Unsupported content type").with_field_error(
                NON_FIELD_ERRORS,
                "Expected a request body with content type application/json.",
            )
        }
        JsonPayloadError::Deserialize(inner) => {
            Error::validation(deserialize_errors(&inner.to_string()))
        }
        _ => Error::invalid_request("Malformed request body"),
    };
    error.into()
}

/// Convert query string extraction failures into the uniform error body.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    Error::invalid_request("Invalid query parameters")
        .with_field_error(NON_FIELD_ERRORS, err.to_string())
        .into()
}

/// Convert path segment extraction failures into the uniform error body.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected path parameters");
    Error::not_found("Not found").into()
}

/// Attribute a serde error to the field it names, when it names one.
fn deserialize_errors(message: &str) -> FieldErrors {
    match missing_field(message) {
        Some(field) => FieldErrors::single(field, "This field is required."),
        None => FieldErrors::single(NON_FIELD_ERRORS, message),
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests;
