//! Bearer token configuration parsing and validation.
//!
//! Reads the JWT signing secret, token lifetimes and issuer from the
//! environment so they are validated in one place and testable with a mock
//! environment.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::outbound::security::JwtSettings;

pub mod fingerprint;
mod parsing;

use parsing::{parse_bool, parse_ttl};

const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/jwt_secret";
const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const SECRET_FILE_ENV: &str = "KPA_JWT_SECRET_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "KPA_JWT_ALLOW_EPHEMERAL";
const ISSUER_ENV: &str = "KPA_JWT_ISSUER";
const ACCESS_TTL_ENV: &str = "KPA_JWT_ACCESS_TTL_SECONDS";
const REFRESH_TTL_ENV: &str = "KPA_JWT_REFRESH_TTL_SECONDS";
const DEFAULT_ISSUER: &str = "kpa-backend";
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 3_600;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 3_600;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const TTL_EXPECTED: &str = "a positive number of seconds";

/// Build mode for auth configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing secret and fall back to a random one.
    Debug,
    /// Release builds require a readable secret of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kpa_backend::inbound::http::auth_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating auth configuration.
#[derive(thiserror::Error, Debug)]
pub enum AuthConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read JWT secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret file exists but is too short for release builds.
    #[error("JWT secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("KPA_JWT_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
    /// The refresh lifetime must outlast the access lifetime.
    #[error("refresh TTL ({refresh}s) must exceed access TTL ({access}s)")]
    TtlOrder { access: i64, refresh: i64 },
}

/// Build JWT settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use kpa_backend::inbound::http::auth_config::{BuildMode, auth_settings_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let secret_path = std::env::temp_dir().join("jwt_secret_example");
/// std::fs::write(&secret_path, vec![b'k'; 32])?;
///
/// let secret_path = secret_path.to_string_lossy().to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "KPA_JWT_SECRET_FILE" => Some(secret_path.clone()),
///     "KPA_JWT_ACCESS_TTL_SECONDS" => Some("900".to_string()),
///     _ => None,
/// });
///
/// let settings = auth_settings_from_env(&env, BuildMode::Release)?;
/// assert_eq!(settings.access_ttl_seconds, 900);
/// assert_eq!(settings.issuer, "kpa-backend");
/// # Ok(())
/// # }
/// ```
pub fn auth_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<JwtSettings, AuthConfigError> {
    let access_ttl_seconds = ttl_from_env(env, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECONDS)?;
    let refresh_ttl_seconds = ttl_from_env(env, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECONDS)?;
    if refresh_ttl_seconds <= access_ttl_seconds {
        return Err(AuthConfigError::TtlOrder {
            access: access_ttl_seconds,
            refresh: refresh_ttl_seconds,
        });
    }
    let issuer = env
        .string(ISSUER_ENV)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ISSUER.to_owned());
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let secret = secret_from_env(env, mode, allow_ephemeral)?;
    info!(
        fingerprint = %fingerprint::secret_fingerprint(&secret),
        issuer = %issuer,
        "JWT signing secret loaded"
    );

    Ok(JwtSettings {
        secret,
        issuer,
        access_ttl_seconds,
        refresh_ttl_seconds,
    })
}

fn ttl_from_env<E: Env>(
    env: &E,
    name: &'static str,
    default: i64,
) -> Result<i64, AuthConfigError> {
    match env.string(name) {
        None => Ok(default),
        Some(value) => parse_ttl(&value).ok_or(AuthConfigError::InvalidEnv {
            name,
            value,
            expected: TTL_EXPECTED,
        }),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, AuthConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(AuthConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid KPA_JWT_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(AuthConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, AuthConfigError> {
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_string()),
    );

    match std::fs::read(&path) {
        Ok(bytes) => {
            let secret = Zeroizing::new(bytes);
            let length = secret.len();
            if mode == BuildMode::Release && length < SECRET_MIN_LEN {
                return Err(AuthConfigError::SecretTooShort {
                    path,
                    length,
                    min_len: SECRET_MIN_LEN,
                });
            }
            Ok(secret)
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary JWT secret (dev only); tokens will not survive a restart"
                );
                Ok(ephemeral_secret())
            } else {
                Err(AuthConfigError::SecretRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    OsRng.fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests;
