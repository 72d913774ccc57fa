//! MedShare API Server
//!
//! Marketplace core for medical 3D models: authors submit models, moderators
//! approve or reject them, and users like and download what gets published.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use medshare_migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{PostgresEngagementRepository, PostgresModelRepository, PostgresUserRepository};
use app::{EngagementService, ModerationService, UserService};
use config::Config;
use domain::entities::DownloadDebounce;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PostgresUserRepository>>,
    pub moderation_service: Arc<
        ModerationService<
            PostgresModelRepository,
            PostgresUserRepository,
            PostgresEngagementRepository,
        >,
    >,
    pub engagement_service:
        Arc<EngagementService<PostgresModelRepository, PostgresEngagementRepository>>,
    pub api_base_url: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,medshare_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MedShare API...");

    let config = Config::from_env().context("DATABASE_URL must be set")?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    // Create adapters
    let user_repo = Arc::new(PostgresUserRepository::new(db.clone()));
    let model_repo = Arc::new(PostgresModelRepository::new(db.clone()));
    let engagement_repo = Arc::new(PostgresEngagementRepository::new(db.clone()));

    // Create application services
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        config.admin_names.clone(),
    ));

    let moderation_service = Arc::new(ModerationService::new(
        model_repo.clone(),
        user_repo.clone(),
        engagement_repo.clone(),
    ));

    let engagement_service = Arc::new(EngagementService::new(
        model_repo.clone(),
        engagement_repo.clone(),
        DownloadDebounce::from_secs(config.download_debounce_secs),
    ));

    let state = AppState {
        user_service,
        moderation_service,
        engagement_service,
        api_base_url: config.api_base_url.clone(),
    };

    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    // (SmartIpKeyExtractor requires X-Forwarded-For headers from reverse proxy)
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    // Rate-limited routes (registration)
    let rate_limited_routes = Router::new()
        .route("/users/register", post(handlers::register))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Public endpoints (optional auth)
    let public_routes = Router::new()
        .route("/models", get(handlers::list_models))
        .route("/models/:id", get(handlers::get_model))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth_middleware,
        ));

    // Protected routes
    let protected_routes = Router::new()
        .route("/models", post(handlers::submit_model))
        .route("/models/mine", get(handlers::list_my_models))
        .route("/models/:id", patch(handlers::update_model))
        .route("/models/:id/engage", post(handlers::engage_model))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Moderator routes: auth runs first, then the moderator gate
    let admin_routes = Router::new()
        .route("/admin/models", get(handlers::list_review_queue))
        .route("/admin/models/stats", get(handlers::review_stats))
        .route("/admin/models/:id/review", post(handlers::review_model))
        .layer(middleware::from_fn(auth::moderator_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Build router
    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(rate_limited_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
