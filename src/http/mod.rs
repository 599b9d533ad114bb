//! HTTP server exposing sample ingest and bucketed queries as JSON.

pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::build_router;
pub use state::AppState;
