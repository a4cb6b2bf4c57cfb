//! HS256 JSON Web Tokens for access and refresh credentials.
//!
//! Both token kinds share one signing secret and are told apart by the `typ`
//! claim. Expiry is checked against the injected [`Clock`] rather than the
//! system time so token lifetimes follow the same clock as the services.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenCodec, TokenCodecError};
use crate::domain::{AccessClaims, RefreshClaims, UserId};

const ACCESS_TYPE: &str = "access";
const REFRESH_TYPE: &str = "refresh";

/// Signing material and lifetimes for [`JwtTokenCodec`].
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: Zeroizing<Vec<u8>>,
    pub issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

/// Wire claims. `jti` is only meaningful on refresh tokens but is set on
/// both so every token is unique.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
    jti: Uuid,
    typ: String,
    #[serde(default)]
    staff: bool,
}

/// [`TokenCodec`] signing HS256 JWTs.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Build a codec from `settings`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use kpa_backend::domain::ports::TokenCodec;
    /// use kpa_backend::outbound::security::{JwtSettings, JwtTokenCodec};
    /// use mockable::DefaultClock;
    /// use zeroize::Zeroizing;
    ///
    /// let codec = JwtTokenCodec::new(
    ///     JwtSettings {
    ///         secret: Zeroizing::new(vec![7; 32]),
    ///         issuer: "kpa".into(),
    ///         access_ttl_seconds: 3_600,
    ///         refresh_ttl_seconds: 604_800,
    ///     },
    ///     Arc::new(DefaultClock),
    /// );
    /// assert_eq!(codec.access_ttl_seconds(), 3_600);
    /// ```
    pub fn new(settings: JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(&settings.secret),
            decoding: DecodingKey::from_secret(&settings.secret),
            validation,
            issuer: settings.issuer,
            access_ttl_seconds: settings.access_ttl_seconds,
            refresh_ttl_seconds: settings.refresh_ttl_seconds,
            clock,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenCodecError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| TokenCodecError::encoding(err.to_string()))
    }

    fn claims(
        &self,
        typ: &str,
        user_id: &UserId,
        expires_at: DateTime<Utc>,
        jti: Uuid,
        staff: bool,
    ) -> Claims {
        Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: self.clock.utc().timestamp(),
            exp: expires_at.timestamp(),
            jti,
            typ: typ.to_owned(),
            staff,
        }
    }

    /// Verify signature, issuer, type and expiry.
    fn verify(
        &self,
        token: &str,
        typ: &str,
    ) -> Result<(Claims, UserId, DateTime<Utc>), TokenCodecError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenCodecError::invalid())?;
        let claims = data.claims;
        if claims.typ != typ {
            return Err(TokenCodecError::invalid());
        }
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or_else(TokenCodecError::invalid)?;
        if expires_at <= self.clock.utc() {
            return Err(TokenCodecError::expired());
        }
        let user_id = UserId::new(&claims.sub).map_err(|_| TokenCodecError::invalid())?;
        Ok((claims, user_id, expires_at))
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenCodecError> {
        self.sign(&self.claims(
            ACCESS_TYPE,
            &claims.user_id,
            claims.expires_at,
            Uuid::new_v4(),
            claims.is_staff,
        ))
    }

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenCodecError> {
        self.sign(&self.claims(
            REFRESH_TYPE,
            &claims.user_id,
            claims.expires_at,
            claims.token_id,
            false,
        ))
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenCodecError> {
        let (claims, user_id, expires_at) = self.verify(token, ACCESS_TYPE)?;
        Ok(AccessClaims {
            user_id,
            is_staff: claims.staff,
            expires_at,
        })
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenCodecError> {
        let (claims, user_id, expires_at) = self.verify(token, REFRESH_TYPE)?;
        Ok(RefreshClaims {
            token_id: claims.jti,
            user_id,
            expires_at,
        })
    }

    fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}
