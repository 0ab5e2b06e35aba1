//! postmirror - A small REST service for posts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /posts, /users/:user_id/posts                            │
//! │  - /health, /metrics                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Post operations                                          │
//! │  - Fallback fetch of missing posts                          │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                           │
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │        Data Layer            │ │        Upstream            │
//! │  - SQLite (sqlx)             │ │  - remote posts/users API  │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `upstream`: Remote post/user API client
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod upstream;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the database pool and upstream client.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Upstream post/user API
    pub upstream: Arc<dyn upstream::PostSource>,

    /// Post operations over `db` and `upstream`
    pub posts: service::PostService,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Build the upstream HTTP client
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let upstream = upstream::HttpPostSource::new(&config.upstream)?;
        tracing::info!(base_url = %config.upstream.base_url, "Upstream client initialized");

        Self::with_upstream(config, Arc::new(upstream)).await
    }

    /// Initialize application state with a caller-supplied upstream
    pub async fn with_upstream(
        config: config::AppConfig,
        upstream: Arc<dyn upstream::PostSource>,
    ) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = Arc::new(data::Database::connect(&config.database.path).await?);
        metrics::POSTS_TOTAL.set(db.count_posts().await?);

        let posts = service::PostService::new(db.clone(), upstream.clone());

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            upstream,
            posts,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower_http::{
        compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
        trace::TraceLayer,
    };

    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::posts_router())
        .route_layer(middleware::from_fn(api::metrics::track_http_metrics))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
