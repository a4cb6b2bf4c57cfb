//! Bearer-token extractor for authenticated handlers.
//!
//! Handlers take [`AuthenticatedActor`] as an argument; the extractor reads
//! `Authorization: Bearer <token>` and resolves the caller through the
//! [`crate::domain::ports::AuthService`] held in [`HttpState`].

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error};

use super::state::HttpState;

/// Message returned when a protected endpoint is called anonymously.
pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided.";
const MALFORMED_HEADER: &str = "Authorization header must use the Bearer scheme";

/// Caller resolved from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

impl AuthenticatedActor {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

/// Extract the bearer token from the request headers.
fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(CREDENTIALS_NOT_PROVIDED))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized(MALFORMED_HEADER))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized(MALFORMED_HEADER))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(Error::unauthorized(MALFORMED_HEADER));
    }
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedActor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            state.auth.authenticate(&token).await.map(Self)
        })
    }
}
