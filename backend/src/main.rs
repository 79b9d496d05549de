//! Service entry-point: loads settings, prepares persistence and serves the
//! enrollment API.

mod server;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use enrollments::outbound::persistence::{DbPool, run_pending_migrations};
use enrollments::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let api_key = settings.api_key().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    info!(api_key_fingerprint = %api_key.fingerprint(), "shared secret loaded");

    let mut config = ServerConfig::new(api_key, bind_addr)
        .with_statement_timeout(settings.statement_timeout());

    if let Some(database_url) = settings.database_url() {
        if settings.run_migrations {
            run_pending_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
        }

        let pool = DbPool::connect(database_url, settings.pool_limits())
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    info!(%bind_addr, "starting enrollment service");
    let (server, health_state) = create_server(config)?;
    let result = server.await;
    health_state.mark_draining();
    result
}
