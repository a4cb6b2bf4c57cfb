//! Port for server-side refresh token bookkeeping.
//!
//! Only token ids are stored. Rotation deletes the presented id and inserts
//! its replacement in one transaction so a refresh token is usable once.
//! Revoked and expired rows of the rotating user are pruned at the same time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{RefreshTokenRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by refresh token repository adapters.
    pub enum RefreshTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "refresh token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "refresh token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Record a freshly issued token.
    async fn store(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError>;

    /// Atomically consume `presented` and store `replacement`, dropping any
    /// of the owner's tokens that are revoked or expired at `now`.
    ///
    /// Returns `false` without storing anything when `presented` is unknown,
    /// already consumed, expired at `now`, or owned by another user.
    async fn rotate(
        &self,
        presented: Uuid,
        replacement: &RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenRepositoryError>;

    /// Revoke every outstanding token of `user_id` as of `at`, returning how
    /// many were revoked.
    async fn revoke_all(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, RefreshTokenRepositoryError>;
}
