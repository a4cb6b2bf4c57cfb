//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod auth_config;
pub mod envelope;
pub mod error;
pub mod forms;
mod forms_dto;
pub mod health;
pub mod maintenance;
mod maintenance_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
mod users_dto;

use actix_web::web;

use crate::domain::MAX_SUBMISSION_BYTES;

pub use error::ApiResult;

/// Register the `/api` routes and the extractor configuration they rely on.
///
/// The caller supplies `web::Data<HttpState>`; health probes are mounted
/// separately because they carry their own state.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use kpa_backend::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_SUBMISSION_BYTES)
            .error_handler(error::json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
    .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
    .service(users::routes(web::scope("/api/users")))
    .service(maintenance::routes(forms::routes(web::scope("/api/forms"))));
}
