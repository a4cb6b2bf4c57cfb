//! Shared wiring for HTTP integration tests: real domain services over the
//! in-memory adapters from `kpa_backend::test_support`.

use std::sync::Arc;

use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::test::TestRequest;
use actix_web::web;
use mockable::Clock;
use serde_json::{Value, json};

use kpa_backend::domain::ports::{PasswordHasher, TokenCodec};
use kpa_backend::domain::{
    AuthenticationService, FormCatalogueService, MaintenanceRecordService, SubmissionService,
    UserDirectoryService,
};
use kpa_backend::inbound::http::state::HttpState;
use kpa_backend::test_support::fixtures::staff_account;
use kpa_backend::test_support::{
    InMemoryBogieChecksheetRepository, InMemoryFormRepository, InMemoryRefreshTokenRepository,
    InMemorySubmissionRepository, InMemoryUserRepository, InMemoryWheelSpecificationRepository,
    MutableClock, PlainTextHasher, TransparentTokenCodec,
};

pub const PASSWORD: &str = "Sup3rSecret!";
pub const STAFF_PHONE: &str = "+1999999999";

/// In-memory backend with handles on the stores tests inspect.
pub struct Backend {
    pub users: Arc<InMemoryUserRepository>,
    pub wheels: Arc<InMemoryWheelSpecificationRepository>,
    pub clock: Arc<MutableClock>,
    state: web::Data<HttpState>,
}

impl Backend {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::fixed());
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let hasher: Arc<dyn PasswordHasher> = Arc::new(PlainTextHasher);
        let codec: Arc<dyn TokenCodec> = Arc::new(TransparentTokenCodec::new(shared_clock.clone()));
        let users = Arc::new(InMemoryUserRepository::new());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let forms = Arc::new(InMemoryFormRepository::new());
        let submissions = Arc::new(InMemorySubmissionRepository::new());
        let wheels = Arc::new(InMemoryWheelSpecificationRepository::new());
        let bogies = Arc::new(InMemoryBogieChecksheetRepository::new());

        let state = web::Data::new(HttpState {
            auth: Arc::new(AuthenticationService::new(
                users.clone(),
                refresh_tokens.clone(),
                hasher.clone(),
                codec,
                shared_clock.clone(),
            )),
            users: Arc::new(UserDirectoryService::new(
                users.clone(),
                refresh_tokens,
                hasher,
                shared_clock.clone(),
            )),
            forms: Arc::new(FormCatalogueService::new(forms.clone(), shared_clock.clone())),
            submissions: Arc::new(SubmissionService::new(
                forms,
                submissions,
                shared_clock.clone(),
            )),
            maintenance: Arc::new(MaintenanceRecordService::new(
                users.clone(),
                wheels.clone(),
                bogies,
                shared_clock,
            )),
        });

        Self {
            users,
            wheels,
            clock,
            state,
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Store a staff account that can log in with [`PASSWORD`].
    pub fn seed_staff(&self) {
        self.users
            .seed(staff_account(STAFF_PHONE), format!("plain${PASSWORD}"));
    }
}

pub fn register_body(phone: &str) -> Value {
    json!({
        "phone_number": phone,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
        "first_name": "Asha",
        "last_name": "Kumar",
    })
}

pub fn login_body(phone: &str) -> Value {
    json!({ "phone_number": phone, "password": PASSWORD })
}

/// Attach `Authorization: Bearer <token>` to `request`.
pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("token is header-safe");
    request.insert_header((AUTHORIZATION, value))
}

/// Pull the access token out of a register or login response body.
pub fn access_token(body: &Value) -> String {
    body["data"]["tokens"]["access_token"]
        .as_str()
        .expect("access token in body")
        .to_owned()
}
