//! Operators Club Directory Service
//!
//! Serves the club's directory of companies and open-source repositories:
//! tag-decorated listings, single-entity detail views, and per-user like
//! toggles backed by Postgres. Session tokens are verified by the external
//! identity provider.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use deadpool_postgres::{Config as PgConfig, Runtime};
use dotenvy::dotenv;
use tokio_postgres::NoTls;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod api;
mod auth;
mod config;
mod db;
mod error;
mod identity;
mod likes;
mod tags;

pub use config::AppConfig;
pub use error::{Error, Result};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: deadpool_postgres::Pool,
    pub like_store: db::likes::PgLikeStore,
    pub identity: identity::IdentityClient,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,opsclub_directory=debug")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    info!(
        "Starting Operators Club directory service on {}:{}",
        config.host, config.port
    );

    // Initialize database pool
    let mut pg_config = PgConfig::new();
    pg_config.url = Some(config.database_url.clone());
    let db_pool = pg_config.create_pool(Some(Runtime::Tokio1), NoTls)?;

    // Run migrations
    db::run_migrations(&db_pool).await?;

    // Initialize identity provider client
    let identity = identity::IdentityClient::new(
        config.identity_url.clone(),
        config.identity_api_key.clone(),
    );

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        like_store: db::likes::PgLikeStore::new(db_pool.clone()),
        db_pool,
        identity,
    });

    // Build router
    let app = Router::new()
        .route("/api/companies", get(api::companies::list_companies))
        .route("/api/companies/liked", get(api::companies::liked_companies))
        .route("/api/companies/:id", get(api::companies::get_company))
        .route("/api/companies/:id/like", post(api::companies::like_company))
        .route("/api/repos", get(api::repos::list_repos))
        .route("/api/repos/liked", get(api::repos::liked_repos))
        .route("/api/repos/:id", get(api::repos::get_repo))
        .route("/api/repos/:id/like", post(api::repos::like_repo))
        // Health check
        .route("/health", get(health_check))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
