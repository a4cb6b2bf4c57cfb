//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, forms,
//!   maintenance records, health)
//! - **Schemas**: the error wrappers ([`ErrorSchema`], [`ErrorCodeSchema`])
//!   and the response bodies shared between endpoints
//! - **Security**: bearer JWT authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::forms::{FormResponse, SubmissionResponse};
use crate::inbound::http::maintenance::{BogieChecksheetResponse, WheelSpecificationResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{AuthResponse, TokenPairResponse, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by every protected path.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/users/login or /api/users/refresh.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "KPA backend API",
        description = "Railway maintenance records, dynamic forms and phone-number accounts.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::refresh,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::deactivate_user,
        crate::inbound::http::forms::create_definition,
        crate::inbound::http::forms::list_definitions,
        crate::inbound::http::forms::get_definition,
        crate::inbound::http::forms::set_definition_active,
        crate::inbound::http::forms::submit,
        crate::inbound::http::forms::list_submissions,
        crate::inbound::http::forms::get_submission,
        crate::inbound::http::forms::review_submission,
        crate::inbound::http::maintenance::create_wheel_specification,
        crate::inbound::http::maintenance::list_wheel_specifications,
        crate::inbound::http::maintenance::set_wheel_specification_status,
        crate::inbound::http::maintenance::create_bogie_checksheet,
        crate::inbound::http::maintenance::create_bogie_checksheet_alias,
        crate::inbound::http::maintenance::list_bogie_checksheets,
        crate::inbound::http::maintenance::set_bogie_checksheet_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserResponse,
        TokenPairResponse,
        AuthResponse,
        FormResponse,
        SubmissionResponse,
        WheelSpecificationResponse,
        BogieChecksheetResponse,
    )),
    tags(
        (name = "users", description = "Registration, tokens and account administration"),
        (name = "forms", description = "Dynamic form definitions and submissions"),
        (name = "maintenance", description = "Wheel specifications and bogie checksheets"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        for field in ["success", "code", "message", "errors", "traceId"] {
            assert_object_schema_has_field(error_schema, field);
        }
    }

    #[test]
    fn wheel_specification_schema_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get("WheelSpecificationResponse")
            .expect("wheel specification schema");

        assert_object_schema_has_field(schema, "formNumber");
        assert_object_schema_has_field(schema, "submittedBy");
    }

    #[rstest]
    #[case("RegisterRequest", "confirm_password")]
    #[case("ProfileUpdateRequest", "bio")]
    #[case("FormDraftRequest", "fields")]
    #[case("FieldDraftRequest", "validation_rules")]
    #[case("RecordStatusRequest", "status")]
    fn defaulted_request_bodies_are_documented(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).unwrap_or_else(|| panic!("missing {name}"));

        assert_object_schema_has_field(schema, field);
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[rstest]
    #[case("/api/users/register")]
    #[case("/api/users/login")]
    #[case("/api/forms/definitions")]
    #[case("/api/forms/submissions/{id}/status")]
    #[case("/api/forms/wheel-specifications")]
    #[case("/api/forms/bogie-checksheet")]
    #[case("/health/ready")]
    fn every_surface_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
