//! Builders wiring Diesel repositories and security adapters into the
//! domain services behind [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use kpa_backend::domain::ports::{PasswordHasher, TokenCodec};
use kpa_backend::domain::{
    AuthenticationService, FormCatalogueService, MaintenanceRecordService, SubmissionService,
    UserDirectoryService,
};
use kpa_backend::inbound::http::state::HttpState;
use kpa_backend::outbound::persistence::{
    DbPool, DieselBogieChecksheetRepository, DieselFormRepository,
    DieselRefreshTokenRepository, DieselSubmissionRepository, DieselUserRepository,
    DieselWheelSpecificationRepository,
};
use kpa_backend::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};

use super::ServerConfig;

/// Repositories sharing one pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    refresh_tokens: Arc<DieselRefreshTokenRepository>,
    forms: Arc<DieselFormRepository>,
    submissions: Arc<DieselSubmissionRepository>,
    wheels: Arc<DieselWheelSpecificationRepository>,
    bogies: Arc<DieselBogieChecksheetRepository>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(DieselRefreshTokenRepository::new(pool.clone())),
            forms: Arc::new(DieselFormRepository::new(pool.clone())),
            submissions: Arc::new(DieselSubmissionRepository::new(pool.clone())),
            wheels: Arc::new(DieselWheelSpecificationRepository::new(pool.clone())),
            bogies: Arc::new(DieselBogieChecksheetRepository::new(pool.clone())),
        }
    }
}

/// Build the handler state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let codec: Arc<dyn TokenCodec> =
        Arc::new(JwtTokenCodec::new(config.jwt.clone(), clock.clone()));
    let repos = Repositories::new(&config.db_pool);

    web::Data::new(HttpState {
        auth: Arc::new(AuthenticationService::new(
            repos.users.clone(),
            repos.refresh_tokens.clone(),
            hasher.clone(),
            codec,
            clock.clone(),
        )),
        users: Arc::new(UserDirectoryService::new(
            repos.users.clone(),
            repos.refresh_tokens,
            hasher,
            clock.clone(),
        )),
        forms: Arc::new(FormCatalogueService::new(repos.forms.clone(), clock.clone())),
        submissions: Arc::new(SubmissionService::new(
            repos.forms,
            repos.submissions,
            clock.clone(),
        )),
        maintenance: Arc::new(MaintenanceRecordService::new(
            repos.users,
            repos.wheels,
            repos.bogies,
            clock,
        )),
    })
}
