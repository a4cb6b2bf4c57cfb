//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::{App, HttpResponse, test as actix_test, web};
use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn response_body(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error JSON");
    (status, header, body)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection string postgres://secret")
        .with_field_error("db", "leaked")
        .with_trace_id(expected_trace_id.clone());

    let (status, header, body) = response_body(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["errors"], serde_json::json!({}));
    assert_eq!(body["traceId"], expected_trace_id.as_str());
}

#[actix_web::test]
async fn validation_errors_keep_every_field() {
    let mut errors = FieldErrors::new();
    errors.push("email", "This field is required.");
    errors.push("age", "This field is required.");

    let (status, header, body) = response_body(&Error::validation(errors)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["email"][0], "This field is required.");
    assert_eq!(body["errors"]["age"][0], "This field is required.");
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert!(err.errors().is_empty());
}

#[rstest]
#[case("missing field `phone_number` at line 1 column 2", Some("phone_number"))]
#[case("invalid type: integer `3`, expected a string", None)]
fn missing_fields_are_attributed(#[case] message: &str, #[case] expected: Option<&str>) {
    assert_eq!(missing_field(message), expected);
}

#[derive(Deserialize)]
struct Body {
    #[expect(dead_code, reason = "only deserialised")]
    name: String,
}

async fn post_json(body: &'static str, limit: usize) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(
                web::JsonConfig::default()
                    .limit(limit)
                    .error_handler(json_error_handler),
            )
            .route(
                "/",
                web::post().to(|_: web::Json<Body>| async { HttpResponse::Ok().finish() }),
            ),
    )
    .await;
    let req = TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

#[actix_web::test]
async fn missing_json_fields_use_the_error_body() {
    let (status, body) = post_json("{}", 1024).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["name"][0], "This field is required.");
}

#[actix_web::test]
async fn oversized_bodies_are_reported_on_payload() {
    let (status, body) = post_json(r#"{"name": "a long enough value"}"#, 8).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["payload"].is_array());
}
