//! Wiring and serving.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::auth::{AuthState, PasswordHasher, TokenIssuer, TokenVerifier};
use crate::category::SpiceCategoryRepository;
use crate::config::AppConfig;
use crate::db::Database;
use crate::product::ProductRepository;
use crate::user::{UserRepository, UserService};

/// Build the shared handler state from configuration and an open database.
///
/// Fails if the auth configuration is unusable (missing or weak secret).
pub fn build_state(config: &AppConfig, database: &Database) -> Result<AppState> {
    let secret = config
        .auth
        .validated_secret()
        .context("invalid auth configuration")?;
    let ttl = config.auth.token_ttl();

    let issuer = TokenIssuer::new(secret.as_bytes(), ttl);
    let verifier = TokenVerifier::new(secret.as_bytes());
    let hasher = PasswordHasher::new(config.auth.bcrypt_cost)?;

    let pool = database.pool().clone();
    let users = UserService::new(Arc::new(UserRepository::new(pool.clone())), hasher, issuer);

    Ok(AppState::new(
        users,
        AuthState::new(verifier),
        SpiceCategoryRepository::new(pool.clone()),
        ProductRepository::new(pool),
    )
    .with_catalog_auth(config.catalog.require_auth)
    .with_allowed_origins(config.cors.allowed_origins.clone()))
}

/// Connect to storage, build the router and serve until a shutdown signal.
pub async fn run(config: AppConfig) -> Result<()> {
    let db_path = config.database.resolved_path()?;
    info!("Using database at {}", db_path.display());

    let database = Database::connect_with_retry(
        &db_path,
        config.database.connect_attempts,
        config.database.retry_delay(),
    )
    .await?;

    let state = build_state(&config, &database)?;
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("binding to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    database.pool().close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
