//! HTTP routing configuration for all API endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;

use crate::http::handlers::*;
use crate::http::state::AppState;

/// Build the Axum router with all API endpoints.
///
/// # Parameters
///
/// - `state` - Application state containing configuration and dependencies
///
/// # Returns
///
/// Returns configured Axum `Router`. Responses are gzip-compressed when the
/// client sends `Accept-Encoding: gzip`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", post(add_metrics))
        .route("/metrics/{id}", get(get_data_for_id).post(add_metric))
        .layer(CompressionLayer::new())
        .with_state(state)
}
