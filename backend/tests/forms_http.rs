//! Dynamic form definitions, submissions and review over HTTP with real
//! services.

mod support;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use serde_json::{Value, json};

use kpa_backend::inbound::http::configure;
use support::{Backend, STAFF_PHONE, access_token, bearer, login_body, register_body};

const PHONE: &str = "+1234567890";

macro_rules! send {
    ($app:expr, $request:expr) => {{
        let response = test::call_service(&$app, $request.to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }};
}

fn inspection_form() -> Value {
    json!({
        "title": "Coach inspection",
        "form_type": "survey",
        "fields": [
            { "label": "Email", "field_type": "email", "required": true },
            {
                "label": "Age",
                "field_type": "number",
                "required": true,
                "validation_rules": { "min": 18, "max": 70 }
            }
        ]
    })
}

#[actix_web::test]
async fn submissions_are_validated_and_reviewed_in_order() {
    let backend = Backend::new();
    backend.seed_staff();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(login_body(STAFF_PHONE))
    );
    let staff = access_token(&body);
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    assert_eq!(status, StatusCode::CREATED);
    let member = access_token(&body);

    let (status, body) = send!(
        app,
        bearer(test::TestRequest::post(), &staff)
            .uri("/api/forms/definitions")
            .set_json(inspection_form())
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let form_id = body["data"]["id"].as_str().expect("form id").to_owned();
    let submit_uri = format!("/api/forms/definitions/{form_id}/submissions");

    let (status, body) = send!(
        app,
        bearer(test::TestRequest::post(), &member)
            .uri(&submit_uri)
            .set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["email"][0], "This field is required.");
    assert_eq!(body["errors"]["age"][0], "This field is required.");

    let (status, body) = send!(
        app,
        bearer(test::TestRequest::post(), &member)
            .uri(&submit_uri)
            .set_json(json!({ "email": "ops@example.com", "age": 30 }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    let review_uri = format!(
        "/api/forms/submissions/{}/status",
        body["data"]["id"].as_str().expect("submission id")
    );

    let (status, _) = send!(
        app,
        bearer(test::TestRequest::put(), &staff)
            .uri(&review_uri)
            .set_json(json!({ "status": "approved" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        bearer(test::TestRequest::put(), &member)
            .uri(&review_uri)
            .set_json(json!({ "status": "reviewed" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    for next in ["reviewed", "approved"] {
        let (status, body) = send!(
            app,
            bearer(test::TestRequest::put(), &staff)
                .uri(&review_uri)
                .set_json(json!({ "status": next, "notes": "checked" }))
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], next);
    }
}

#[actix_web::test]
async fn members_cannot_define_forms() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;
    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users/register")
            .set_json(register_body(PHONE))
    );
    let member = access_token(&body);

    let (status, body) = send!(
        app,
        bearer(test::TestRequest::post(), &member)
            .uri("/api/forms/definitions")
            .set_json(inspection_form())
    );

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorised() {
    let backend = Backend::new();
    let app = test::init_service(
        App::new()
            .app_data(backend.state())
            .configure(configure),
    )
    .await;

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/forms/definitions")
    );

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Authentication credentials were not provided."
    );
}
