//! # Bucketed Metrics
//!
//! A time-series metric store that answers queries either with the raw
//! samples of a series or with time-bucketed min/avg/max aggregates.
//!
//! This library provides components for:
//! - **Bucketing Engine**: Fixed-count buckets over the query interval and
//!   fixed-width wraparound buckets that overlay many periods onto one
//! - **Query Engine**: Default time windows, storage fetch and dispatch
//! - **In-Memory Storage**: Sorted per-series sample storage
//! - **HTTP API**: JSON ingest and query endpoints
//!
//! # Examples
//!
//! ```
//! use bucketed_metrics::bucketing::{aggregate, BucketingParams, QueryOutput};
//! use bucketed_metrics::Sample;
//!
//! let samples = vec![Sample::new("cpu", 15, 1.0), Sample::new("cpu", 18, 3.0)];
//! let params = BucketingParams { number_of_buckets: 4, ..BucketingParams::default() };
//!
//! let QueryOutput::Buckets(points) = aggregate("cpu", 0, 40, &params, &samples).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(points[1].avg(), 2.0);
//! ```

pub mod bucketing;
pub mod http;
pub mod query_engine;
pub mod storage;
pub mod timeutil;

// Re-export commonly used types for convenience
pub use bucketing::{aggregate, BucketPoint, BucketingParams, DataPoint, QueryOutput};
pub use query_engine::{MetricQuery, QueryEngine, QueryError};
pub use storage::{MemoryStorage, Sample, Storage, StorageError};
