//! Server settings loaded via OrthoConfig.
//!
//! Values come from `KPA_*` environment variables, an optional configuration
//! file and command-line flags, in increasing order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("KPA_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Process-level configuration for the HTTP server and database pool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KPA")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: Option<u32>,
    pub db_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection before failing with 503.
    pub db_connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving; on unless set to `false`.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    /// Whether embedded migrations run at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Build the pool configuration. A database URL is mandatory.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .with_min_idle(self.db_min_idle)
            .with_connection_timeout(Duration::from_secs(
                self.db_connection_timeout_secs
                    .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
            )))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "KPA_BIND_ADDR",
        "KPA_DATABASE_URL",
        "KPA_DB_MAX_CONNECTIONS",
        "KPA_DB_MIN_IDLE",
        "KPA_DB_CONNECTION_TIMEOUT_SECS",
        "KPA_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("kpa-backend")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.run_migrations, None);
        assert!(settings.run_migrations());
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(matches!(
            settings.pool_config(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("KPA_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("KPA_DATABASE_URL", Some("postgres://kpa@db/kpa".to_owned())),
            ("KPA_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("KPA_DB_MIN_IDLE", None),
            ("KPA_DB_CONNECTION_TIMEOUT_SECS", Some("5".to_owned())),
            ("KPA_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.run_migrations());
        assert_eq!(settings.db_max_connections, Some(4));
        assert_eq!(settings.bind_addr().expect("address").port(), 9000);
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://kpa@db/kpa");
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let settings = AppSettings {
            bind_addr: Some("localhost".into()),
            database_url: None,
            db_max_connections: None,
            db_min_idle: None,
            db_connection_timeout_secs: None,
            run_migrations: None,
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
    }
}
