//! User store connection pool
//!
//! The users table is the only state this service persists.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const APPLICATION_NAME: &str = "mimic-sphere";

/// Connections are recycled after this long regardless of activity
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Pool settings derived from `config`, without connecting
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(MAX_CONNECTION_LIFETIME)
        .test_before_acquire(true)
}

fn connect_options(url: &str) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(url).context("Invalid database URL")?;
    Ok(options.application_name(APPLICATION_NAME))
}

/// Connect to the user store
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = pool_options(config)
        .connect_with(connect_options(&config.url)?)
        .await
        .context("Failed to connect to the user store")?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "User store pool ready"
    );
    Ok(pool)
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("User store migrations applied");
    Ok(())
}

/// Round-trip a trivial query; used by the readiness probe
pub async fn health_check(pool: &PgPool) -> Result<()> {
    if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
        warn!(error = %e, "User store unreachable");
        return Err(e.into());
    }
    Ok(())
}
