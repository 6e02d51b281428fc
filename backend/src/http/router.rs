//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only API, any origin may fetch
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/gates", get(handlers::list_gates))
        .route("/gates/{gate_id}", get(handlers::get_gate))
        .route("/delays", get(handlers::get_delays))
        .route("/timeline", get(handlers::get_timeline))
        .route("/timeline/{gate_id}", get(handlers::get_gate_timeline))
        .route("/stream", get(handlers::stream_snapshots));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
