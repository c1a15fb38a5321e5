//! Mimic Sphere Backend
//!
//! HTTP front for user accounts of the Mimic AI Sphere.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and routing
//! - Services: registration, login, profile lookup
//! - Auth: password digests and bearer tokens
//! - Repositories: PostgreSQL access with SQLx

use anyhow::Result;
use mimic_sphere_backend::{
    auth::TokenAuthority,
    config::{self, Environment},
    db, routes,
    state::AppState,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let environment = Environment::current();
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = environment.as_str(),
        "Starting Mimic Sphere Backend"
    );

    // Missing or weak signing key in production stops startup here
    let signing_key = config.auth.signing_key(environment)?;
    let tokens = TokenAuthority::new(&signing_key, config.auth.token_ttl()?);

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Production runs migrations as a separate job
    if environment != Environment::Production {
        db::run_migrations(&db_pool).await?;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db_pool, config, tokens);
    let app = routes::create_router(state);

    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "mimic_sphere_backend=info,tower_http=info".into()
        } else {
            "mimic_sphere_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
