//! HTTP handlers for the metrics API.

pub mod metrics;

// Re-export handlers for easier access
pub use metrics::{add_metric, add_metrics, get_data_for_id};
