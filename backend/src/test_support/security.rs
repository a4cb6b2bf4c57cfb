//! Deterministic stand-ins for the hashing and token signing adapters.
//!
//! Neither type is secure; they keep tests fast and their output readable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{PasswordHashError, PasswordHasher, TokenCodec, TokenCodecError};
use crate::domain::{AccessClaims, RefreshClaims, UserId};

const HASH_PREFIX: &str = "plain$";

/// Stores passwords behind a fixed prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{HASH_PREFIX}{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let Some(stored) = hash.strip_prefix(HASH_PREFIX) else {
            return Err(PasswordHashError::malformed_hash("missing plain$ prefix"));
        };
        Ok(stored == password)
    }
}

/// Encodes claims as dot-separated plain text and checks expiry against a
/// shared clock.
///
/// Access tokens look like `access.<user>.<staff>.<exp>`; refresh tokens like
/// `refresh.<jti>.<user>.<exp>`.
pub struct TransparentTokenCodec {
    clock: Arc<dyn Clock>,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TransparentTokenCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttls(clock, 3_600, 7 * 24 * 3_600)
    }

    pub fn with_ttls(
        clock: Arc<dyn Clock>,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            clock,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    fn check_expiry(&self, raw: &str) -> Result<DateTime<Utc>, TokenCodecError> {
        let seconds: i64 = raw.parse().map_err(|_| TokenCodecError::invalid())?;
        let expires_at =
            DateTime::from_timestamp(seconds, 0).ok_or_else(TokenCodecError::invalid)?;
        if expires_at <= self.clock.utc() {
            return Err(TokenCodecError::expired());
        }
        Ok(expires_at)
    }
}

fn parse_user(raw: &str) -> Result<UserId, TokenCodecError> {
    UserId::new(raw).map_err(|_| TokenCodecError::invalid())
}

impl TokenCodec for TransparentTokenCodec {
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenCodecError> {
        Ok(format!(
            "access.{}.{}.{}",
            claims.user_id,
            claims.is_staff,
            claims.expires_at.timestamp()
        ))
    }

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenCodecError> {
        Ok(format!(
            "refresh.{}.{}.{}",
            claims.token_id,
            claims.user_id,
            claims.expires_at.timestamp()
        ))
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenCodecError> {
        let parts: Vec<&str> = token.split('.').collect();
        let ["access", user, staff, exp] = parts.as_slice() else {
            return Err(TokenCodecError::invalid());
        };
        Ok(AccessClaims {
            user_id: parse_user(user)?,
            is_staff: staff.parse().map_err(|_| TokenCodecError::invalid())?,
            expires_at: self.check_expiry(exp)?,
        })
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenCodecError> {
        let parts: Vec<&str> = token.split('.').collect();
        let ["refresh", jti, user, exp] = parts.as_slice() else {
            return Err(TokenCodecError::invalid());
        };
        Ok(RefreshClaims {
            token_id: Uuid::parse_str(jti).map_err(|_| TokenCodecError::invalid())?,
            user_id: parse_user(user)?,
            expires_at: self.check_expiry(exp)?,
        })
    }

    fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}
