//! Success envelope shared by every JSON endpoint.
//!
//! Failures serialise through [`crate::domain::Error`]; successes wrap their
//! payload as `{"success": true, "message": …, "data": …}`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Successful response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary of the outcome.
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Render the envelope with `status`.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// `200 OK` with an envelope.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    Envelope::new(message, data).respond(StatusCode::OK)
}

/// `201 Created` with an envelope.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    Envelope::new(message, data).respond(StatusCode::CREATED)
}
