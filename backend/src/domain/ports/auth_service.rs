//! Driving port for registration, login, and token handling.
//!
//! Inbound adapters call this port to exchange credentials for tokens and to
//! resolve bearer tokens into an [`Actor`] without touching persistence or
//! signing keys directly.

use async_trait::async_trait;

use crate::domain::{
    Actor, Error, LoginCredentials, PasswordChange, RegistrationRequest, TokenPair, User,
};

/// Account and token pair returned by registration and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub user: User,
    pub tokens: TokenPair,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, request: RegistrationRequest) -> Result<AuthGrant, Error>;

    /// Verify credentials. Unknown phone numbers, wrong passwords, and
    /// inactive accounts fail identically.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthGrant, Error>;

    /// Exchange a refresh token for a new pair; the presented token is
    /// consumed.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error>;

    /// Resolve an access token into the calling account.
    async fn authenticate(&self, access_token: &str) -> Result<Actor, Error>;

    /// Change the caller's password and revoke their refresh tokens.
    async fn change_password(&self, actor: &Actor, change: PasswordChange) -> Result<(), Error>;
}
