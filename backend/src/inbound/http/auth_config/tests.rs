//! Unit tests for auth configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use uuid::Uuid;

struct TempSecretFile(NamedTempFile);

impl TempSecretFile {
    fn new(len: usize) -> std::io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&vec![b's'; len])?;
        Ok(Self(file))
    }

    fn path_str(&self) -> String {
        self.0.path().to_string_lossy().into_owned()
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn missing_secret_path() -> String {
    std::env::temp_dir()
        .join(format!("jwt-secret-missing-{}", Uuid::new_v4()))
        .to_string_lossy()
        .to_string()
}

fn expect_error(result: Result<JwtSettings, AuthConfigError>, label: &str) -> AuthConfigError {
    match result {
        Ok(_) => panic!("{label}"),
        Err(error) => error,
    }
}

#[rstest]
fn release_reads_secret_and_defaults() {
    let secret = TempSecretFile::new(SECRET_MIN_LEN).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, secret.path_str())]));

    let settings = auth_settings_from_env(&env, BuildMode::Release).expect("valid settings");

    assert_eq!(settings.secret.len(), SECRET_MIN_LEN);
    assert_eq!(settings.issuer, DEFAULT_ISSUER);
    assert_eq!(settings.access_ttl_seconds, DEFAULT_ACCESS_TTL_SECONDS);
    assert_eq!(settings.refresh_ttl_seconds, DEFAULT_REFRESH_TTL_SECONDS);
}

#[rstest]
fn release_rejects_short_secret() {
    let secret = TempSecretFile::new(SECRET_MIN_LEN - 1).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, secret.path_str())]));

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected short secret to fail",
    );
    assert!(matches!(
        err,
        AuthConfigError::SecretTooShort { length, .. } if length == SECRET_MIN_LEN - 1
    ));
}

#[rstest]
fn debug_accepts_short_secret() {
    let secret = TempSecretFile::new(4).expect("secret file");
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, secret.path_str())]));

    let settings = auth_settings_from_env(&env, BuildMode::Debug).expect("debug settings");
    assert_eq!(settings.secret.len(), 4);
}

#[rstest]
fn release_requires_readable_secret() {
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, missing_secret_path())]));
    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected missing secret to fail",
    );
    assert!(matches!(err, AuthConfigError::SecretRead { .. }));
}

#[rstest]
fn debug_falls_back_to_ephemeral_secret() {
    let env = mock_env(HashMap::from([(SECRET_FILE_ENV, missing_secret_path())]));
    let settings = auth_settings_from_env(&env, BuildMode::Debug).expect("ephemeral secret");
    assert_eq!(settings.secret.len(), EPHEMERAL_SECRET_LEN);
}

#[rstest]
fn release_refuses_ephemeral_allowance() {
    let env = mock_env(HashMap::from([
        (SECRET_FILE_ENV, missing_secret_path()),
        (ALLOW_EPHEMERAL_ENV, "1".to_string()),
    ]));
    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected ephemeral allowance to fail",
    );
    assert!(matches!(err, AuthConfigError::EphemeralNotAllowed));
}

#[rstest]
#[case(ACCESS_TTL_ENV, "soon")]
#[case(REFRESH_TTL_ENV, "0")]
fn invalid_lifetimes_are_rejected(#[case] name: &'static str, #[case] value: &str) {
    let secret = TempSecretFile::new(SECRET_MIN_LEN).expect("secret file");
    let env = mock_env(HashMap::from([
        (SECRET_FILE_ENV, secret.path_str()),
        (name, value.to_string()),
    ]));
    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Debug),
        "expected invalid lifetime to fail",
    );
    assert!(matches!(err, AuthConfigError::InvalidEnv { name: got, .. } if got == name));
}

#[rstest]
fn refresh_must_outlast_access() {
    let secret = TempSecretFile::new(SECRET_MIN_LEN).expect("secret file");
    let env = mock_env(HashMap::from([
        (SECRET_FILE_ENV, secret.path_str()),
        (ACCESS_TTL_ENV, "600".to_string()),
        (REFRESH_TTL_ENV, "600".to_string()),
    ]));
    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Debug),
        "expected ttl order to fail",
    );
    assert!(matches!(
        err,
        AuthConfigError::TtlOrder {
            access: 600,
            refresh: 600
        }
    ));
}

#[rstest]
fn issuer_is_trimmed() {
    let secret = TempSecretFile::new(SECRET_MIN_LEN).expect("secret file");
    let env = mock_env(HashMap::from([
        (SECRET_FILE_ENV, secret.path_str()),
        (ISSUER_ENV, "  depot-7 ".to_string()),
    ]));
    let settings = auth_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert_eq!(settings.issuer, "depot-7");
}
