//! Backend entry-point: loads settings, migrates the database and serves the
//! REST API with OpenAPI docs in debug builds.

mod server;

use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use kpa_backend::inbound::http::auth_config::{BuildMode, auth_settings_from_env};
use kpa_backend::outbound::persistence::{DbPool, run_pending_migrations};
use kpa_backend::settings::AppSettings;
use server::{ServerConfig, create_server, health_state_for};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let bind_addr = settings.bind_addr()?;
    let pool_config = settings.pool_config()?;

    if settings.run_migrations() {
        let url = pool_config.database_url().to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .map_err(|err| eyre!("migration task panicked: {err}"))??;
        info!(applied, "database migrations complete");
    }

    let jwt = auth_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build database pool")?;

    let config = ServerConfig::new(bind_addr, pool, jwt);
    let health_state = health_state_for(&config);
    info!(%bind_addr, "starting HTTP server");
    create_server(health_state, config)?.await?;
    Ok(())
}
