//! HTTP surface.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | liveness check |
//! | `POST /api/analyze-orders` | current workload report |
//! | `POST /api/assign-orders` | balanced assignment |
//! | `POST /api/assign-orders/export` | balanced assignment as CSV |
//!
//! The router holds no mutable state: every handler reads the shared
//! [`Balancer`] and builds its response from the request alone.

mod error;
mod handlers;

pub use error::ApiError;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::balancer::Balancer;

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub balancer: Arc<Balancer>,
}

/// Builds the service router.
pub fn router(balancer: Balancer, body_limit_bytes: usize) -> Router {
    let state = AppState {
        balancer: Arc::new(balancer),
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/analyze-orders", post(handlers::analyze_orders))
        .route("/api/assign-orders", post(handlers::assign_orders))
        .route("/api/assign-orders/export", post(handlers::export_assignments))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
