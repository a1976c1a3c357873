//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: storage, cache, editor sessions (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token resolved to the caller's profile
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::rate_limit::{self, Limits};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Authenticated API router without rate limiting, for embedding and tests.
pub fn api_router(state: AppState) -> Router<AppState> {
    api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let api = rate_limit::apply(api_router(state.clone()), Limits::API, behind_proxy);
    let health = rate_limit::apply(
        Router::new().route("/health", get(health_handler)),
        Limits::PUBLIC,
        behind_proxy,
    );

    let router = Router::new()
        .merge(health)
        .nest("/api", api)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
