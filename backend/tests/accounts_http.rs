//! Registration, login and refresh rotation over HTTP with real services.

mod support;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use futures::future::join;
use serde_json::{Value, json};

use kpa_backend::Trace;
use kpa_backend::domain::TRACE_ID_HEADER;
use kpa_backend::inbound::http::configure;
use support::{Backend, access_token, bearer, login_body, register_body};

const PHONE: &str = "+1234567890";

macro_rules! send {
    ($app:expr, $request:expr) => {{
        let response = test::call_service(&$app, $request.to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn refresh_tokens_are_accepted_once() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);
    let original = body["data"]["tokens"]["refresh_token"].clone();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/refresh")
            .set_json(json!({ "refresh_token": original }))
    );
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refresh_token"].clone();
    assert_ne!(rotated, original);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/refresh")
            .set_json(json!({ "refresh_token": original }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/refresh")
            .set_json(json!({ "refresh_token": rotated }))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn concurrent_refreshes_with_one_token_rotate_once() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["tokens"]["refresh_token"].clone();

    let first = test::TestRequest::post()
        .uri("/api/users/refresh")
        .set_json(json!({ "refresh_token": token }))
        .to_request();
    let second = test::TestRequest::post()
        .uri("/api/users/refresh")
        .set_json(json!({ "refresh_token": token }))
        .to_request();
    let (first, second) = join(
        test::call_service(&app, first),
        test::call_service(&app, second),
    )
    .await;

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::UNAUTHORIZED]);
}

#[actix_web::test]
async fn phone_numbers_register_once() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["errors"].get("phone_number").is_some());
    assert_eq!(backend.users.count(), 1);
}

#[actix_web::test]
async fn wrong_passwords_are_unauthorised_with_a_trace_id() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .wrap(Trace)
            .configure(configure),
    )
    .await;
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "phone_number": PHONE, "password": "not-the-password" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["traceId"], header);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn profile_reflects_the_registered_account() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(login_body(PHONE))
    );
    let token = access_token(&body);

    let (status, body) = send!(
        app,
        bearer(test::TestRequest::get(), &token).uri("/api/users/profile")
    );

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone_number"], PHONE);
    assert_eq!(body["data"]["full_name"], "Asha Kumar");
    assert_eq!(body["data"]["is_staff"], false);
}
