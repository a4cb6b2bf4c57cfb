//! Phone/password authentication with rotating refresh tokens.
//!
//! Access tokens are stateless. Refresh tokens are single use: every refresh
//! consumes the presented token id and records its replacement atomically in
//! the [`RefreshTokenRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    AuthGrant, AuthService, PasswordHasher, RefreshTokenRepository, TokenCodec, TokenCodecError,
    UserRepository,
};
use crate::domain::service_support::{
    fetch_user, map_hash_error, map_refresh_token_error, map_user_error,
};
use crate::domain::{
    AccessClaims, Actor, Employment, Error, INVALID_CREDENTIALS, INVALID_REFRESH_TOKEN,
    LoginCredentials, NewUser, PasswordChange, PhoneNumber, RefreshClaims, RefreshTokenRecord,
    Registration, RegistrationRequest, TOKEN_TYPE, TokenPair, User, UserId, UserProfile,
};

const INVALID_ACCESS_TOKEN: &str = "Invalid or expired access token";

fn map_codec_error(error: TokenCodecError) -> Error {
    Error::internal(format!("token signing failed: {error}"))
}

/// Authentication service implementing [`AuthService`].
#[derive(Clone)]
pub struct AuthenticationService<U, R> {
    users: Arc<U>,
    refresh_tokens: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<U, R> AuthenticationService<U, R> {
    /// Create a service over the given adapters.
    pub fn new(
        users: Arc<U>,
        refresh_tokens: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            hasher,
            codec,
            clock,
        }
    }
}

impl<U, R> AuthenticationService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    fn refresh_record(&self, user_id: UserId, now: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token_id: Uuid::new_v4(),
            user_id,
            issued_at: now,
            expires_at: now + TimeDelta::seconds(self.codec.refresh_ttl_seconds()),
        }
    }

    fn sign_pair(
        &self,
        user: &User,
        refresh: &RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, Error> {
        let access_ttl = self.codec.access_ttl_seconds();
        let access_token = self
            .codec
            .encode_access(&AccessClaims {
                user_id: user.id,
                is_staff: user.is_staff,
                expires_at: now + TimeDelta::seconds(access_ttl),
            })
            .map_err(map_codec_error)?;
        let refresh_token = self
            .codec
            .encode_refresh(&RefreshClaims {
                token_id: refresh.token_id,
                user_id: refresh.user_id,
                expires_at: refresh.expires_at,
            })
            .map_err(map_codec_error)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_owned(),
            expires_in: access_ttl,
        })
    }

    async fn issue_pair(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, Error> {
        let record = self.refresh_record(user.id, now);
        self.refresh_tokens
            .store(&record)
            .await
            .map_err(map_refresh_token_error)?;
        self.sign_pair(user, &record, now)
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, Error> {
        self.hasher.verify(password, hash).map_err(map_hash_error)
    }
}

#[async_trait]
impl<U, R> AuthService for AuthenticationService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    async fn register(&self, request: RegistrationRequest) -> Result<AuthGrant, Error> {
        let registration = Registration::try_from_request(request).map_err(Error::validation)?;
        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            phone_number: registration.phone_number,
            email: registration.email,
            profile: UserProfile {
                first_name: registration.first_name,
                last_name: registration.last_name,
                ..UserProfile::default()
            },
            employment: Employment::default(),
            is_staff: false,
            is_active: true,
            date_joined: now,
            last_login: Some(now),
        };
        self.users
            .create(&NewUser {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "registered user");
        let tokens = self.issue_pair(&user, now).await?;
        Ok(AuthGrant { user, tokens })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthGrant, Error> {
        let rejected = || Error::unauthorized(INVALID_CREDENTIALS);
        let Ok(phone_number) = PhoneNumber::new(credentials.phone_number()) else {
            return Err(rejected());
        };
        let Some(stored) = self
            .users
            .find_credentials(&phone_number)
            .await
            .map_err(map_user_error)?
        else {
            debug!("login for unknown phone number");
            return Err(rejected());
        };
        if !self.verify_password(credentials.password(), &stored.password_hash)? {
            debug!(user_id = %stored.user.id, "login with wrong password");
            return Err(rejected());
        }
        if !stored.user.is_active {
            debug!(user_id = %stored.user.id, "login for inactive account");
            return Err(rejected());
        }

        let now = self.clock.utc();
        let mut user = stored.user;
        self.users
            .record_login(&user.id, now)
            .await
            .map_err(map_user_error)?;
        user.last_login = Some(now);
        let tokens = self.issue_pair(&user, now).await?;
        Ok(AuthGrant { user, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let rejected = || Error::unauthorized(INVALID_REFRESH_TOKEN);
        let claims = self.codec.decode_refresh(refresh_token).map_err(|err| {
            debug!(error = %err, "refresh token rejected by codec");
            rejected()
        })?;
        let user = match self.users.find_by_id(&claims.user_id).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => return Err(rejected()),
            Err(err) => return Err(map_user_error(err)),
        };

        let now = self.clock.utc();
        let replacement = self.refresh_record(user.id, now);
        let rotated = self
            .refresh_tokens
            .rotate(claims.token_id, &replacement, now)
            .await
            .map_err(map_refresh_token_error)?;
        if !rotated {
            info!(user_id = %user.id, "refresh token reuse rejected");
            return Err(rejected());
        }
        self.sign_pair(&user, &replacement, now)
    }

    async fn authenticate(&self, access_token: &str) -> Result<Actor, Error> {
        let claims = self
            .codec
            .decode_access(access_token)
            .map_err(|_| Error::unauthorized(INVALID_ACCESS_TOKEN))?;
        match self.users.find_by_id(&claims.user_id).await {
            Ok(Some(user)) if user.is_active => Ok(Actor {
                user_id: user.id,
                is_staff: user.is_staff,
            }),
            Ok(_) => Err(Error::unauthorized(INVALID_ACCESS_TOKEN)),
            Err(err) => Err(map_user_error(err)),
        }
    }

    async fn change_password(&self, actor: &Actor, change: PasswordChange) -> Result<(), Error> {
        change.validate().map_err(Error::validation)?;
        let user = fetch_user(self.users.as_ref(), &actor.user_id).await?;
        let current = self
            .users
            .password_hash(&user.id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        if !self.verify_password(change.old_password.as_str(), &current)? {
            return Err(Error::invalid_request("Old password is incorrect.")
                .with_field_error("old_password", "Old password is incorrect."));
        }
        let new_hash = self
            .hasher
            .hash(change.new_password.as_str())
            .map_err(map_hash_error)?;
        self.users
            .set_password_hash(&user.id, &new_hash)
            .await
            .map_err(map_user_error)?;
        let revoked = self
            .refresh_tokens
            .revoke_all(&user.id, self.clock.utc())
            .await
            .map_err(map_refresh_token_error)?;
        info!(user_id = %user.id, revoked, "password changed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "authentication_service_tests.rs"]
mod tests;
