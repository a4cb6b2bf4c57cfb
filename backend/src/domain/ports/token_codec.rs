//! Port for signing and verifying bearer tokens.

use crate::domain::{AccessClaims, RefreshClaims};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codec adapters.
    pub enum TokenCodecError {
        /// Signature, structure, or token type did not verify.
        Invalid => "token is invalid",
        /// The token verified but has expired.
        Expired => "token has expired",
        /// Signing failed.
        Encoding { message: String } => "token encoding failed: {message}",
    }
}

/// Stateless token signing. Refresh reuse is detected by
/// [`super::RefreshTokenRepository`], not here.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign an access token.
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenCodecError>;

    /// Sign a refresh token.
    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenCodecError>;

    /// Verify an access token and return its claims.
    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenCodecError>;

    /// Verify a refresh token and return its claims.
    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenCodecError>;

    /// Access token lifetime in seconds.
    fn access_ttl_seconds(&self) -> i64;

    /// Refresh token lifetime in seconds.
    fn refresh_ttl_seconds(&self) -> i64;
}
