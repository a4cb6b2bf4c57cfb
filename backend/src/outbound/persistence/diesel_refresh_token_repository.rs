//! PostgreSQL-backed refresh token ledger.
//!
//! Rotation deletes the presented token with a conditional delete and inserts
//! the replacement in the same transaction. Two concurrent refreshes with one
//! token race on that delete; only one sees a row go. The same transaction
//! prunes the owner's revoked and expired rows so the ledger stays bounded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RefreshTokenRepository, RefreshTokenRepositoryError};
use crate::domain::{RefreshTokenRecord, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewRefreshTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::refresh_tokens;

/// Diesel-backed implementation of the [`RefreshTokenRepository`] port.
#[derive(Clone)]
pub struct DieselRefreshTokenRepository {
    pool: DbPool,
}

impl DieselRefreshTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RefreshTokenRepositoryError {
    map_basic_pool_error(error, RefreshTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RefreshTokenRepositoryError {
    map_basic_diesel_error(
        error,
        RefreshTokenRepositoryError::query,
        RefreshTokenRepositoryError::connection,
    )
}

fn new_row(record: &RefreshTokenRecord) -> NewRefreshTokenRow {
    NewRefreshTokenRow {
        jti: record.token_id,
        user_id: *record.user_id.as_uuid(),
        issued_at: record.issued_at,
        expires_at: record.expires_at,
    }
}

/// Outcome of the conditional revoke inside a rotation.
enum Rotation {
    Rotated,
    Refused,
}

#[async_trait]
impl RefreshTokenRepository for DieselRefreshTokenRepository {
    async fn store(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(refresh_tokens::table)
            .values(&new_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn rotate(
        &self,
        presented: Uuid,
        replacement: &RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = new_row(replacement);
        let owner = row.user_id;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let consumed = diesel::delete(
                        refresh_tokens::table.filter(
                            refresh_tokens::jti
                                .eq(presented)
                                .and(refresh_tokens::user_id.eq(owner))
                                .and(refresh_tokens::revoked_at.is_null())
                                .and(refresh_tokens::expires_at.gt(now)),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    if consumed == 0 {
                        return Ok(Rotation::Refused);
                    }
                    diesel::delete(
                        refresh_tokens::table.filter(
                            refresh_tokens::user_id.eq(owner).and(
                                refresh_tokens::revoked_at
                                    .is_not_null()
                                    .or(refresh_tokens::expires_at.le(now)),
                            ),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(refresh_tokens::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(Rotation::Rotated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            Rotation::Rotated => Ok(true),
            Rotation::Refused => {
                debug!(token_id = %presented, "refresh token rotation refused");
                Ok(false)
            }
        }
    }

    async fn revoke_all(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, RefreshTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let revoked = diesel::update(
            refresh_tokens::table.filter(
                refresh_tokens::user_id
                    .eq(user_id.as_uuid())
                    .and(refresh_tokens::revoked_at.is_null()),
            ),
        )
        .set(refresh_tokens::revoked_at.eq(at))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(revoked as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    fn rows_carry_the_token_id_and_owner() {
        let issued_at = Utc::now();
        let record = RefreshTokenRecord {
            token_id: Uuid::new_v4(),
            user_id: UserId::random(),
            issued_at,
            expires_at: issued_at + Duration::days(7),
        };
        let row = new_row(&record);
        assert_eq!(row.jti, record.token_id);
        assert_eq!(row.user_id, *record.user_id.as_uuid());
        assert_eq!(row.expires_at - row.issued_at, Duration::days(7));
    }
}
