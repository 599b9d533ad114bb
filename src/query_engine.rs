//! Query engine tying storage to the bucketing engine.
//!
//! A query resolves its time window, fetches the raw samples for one series
//! and hands them to [`bucketing::aggregate`]. A failed fetch is returned as
//! is and no aggregation is attempted.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::bucketing::{self, BucketingError, BucketingParams, QueryOutput};
use crate::storage::{dedup_samples, Sample, Storage, StorageError};
use crate::timeutil::{resolve_window, DEFAULT_WINDOW};

/// Errors returned by [`QueryEngine`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The storage backend failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    /// The bucketing parameters were rejected.
    #[error(transparent)]
    Bucketing(#[from] BucketingError),
}

/// A request for the samples of one series.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    pub series_id: String,
    /// Start in milliseconds, defaults to `end - window`
    pub start: Option<i64>,
    /// End in milliseconds, defaults to now
    pub end: Option<i64>,
    pub params: BucketingParams,
}

impl MetricQuery {
    /// Create a raw query over the default window.
    ///
    /// # Parameters
    ///
    /// - `series_id` - Series to read
    ///
    /// # Returns
    ///
    /// Returns a new `MetricQuery` with no explicit range and no bucketing.
    pub fn new(series_id: impl Into<String>) -> Self {
        Self { series_id: series_id.into(), start: None, end: None, params: BucketingParams::default() }
    }

    /// Restrict the query to `[start, end)`.
    pub fn with_range(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the bucketing parameters.
    pub fn with_params(mut self, params: BucketingParams) -> Self {
        self.params = params;
        self
    }
}

/// Storage-backed engine for ingesting samples and running bucketed queries.
#[derive(Clone)]
pub struct QueryEngine {
    storage: Arc<dyn Storage>,
    default_window: Duration,
}

impl QueryEngine {
    /// Create a new query engine with the given storage backend.
    ///
    /// # Parameters
    ///
    /// - `storage` - Shared reference to any storage implementation
    ///
    /// # Returns
    ///
    /// Returns a new `QueryEngine` using the 8 hour default window.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, default_window: DEFAULT_WINDOW }
    }

    /// Override the look-back used when a query has no start.
    pub fn with_default_window(mut self, window: Duration) -> Self {
        self.default_window = window;
        self
    }

    pub fn default_window(&self) -> Duration {
        self.default_window
    }

    /// De-duplicate and store a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if the backend rejects the batch.
    pub fn add_data(&self, samples: Vec<Sample>) -> Result<(), QueryError> {
        let submitted = samples.len();
        let unique = dedup_samples(samples);
        debug!("storing {} samples ({} submitted)", unique.len(), submitted);
        self.storage.add_data(unique)?;
        Ok(())
    }

    /// Run a query.
    ///
    /// # Parameters
    ///
    /// - `query` - Series, optional range and bucketing parameters
    /// - `now` - Current time in milliseconds, used for window defaults
    ///
    /// # Returns
    ///
    /// Returns the raw or bucketed points of the series.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if the fetch fails and
    /// `QueryError::Bucketing` if the parameters are invalid.
    pub fn query(&self, query: &MetricQuery, now: i64) -> Result<QueryOutput, QueryError> {
        let (start, end) = resolve_window(query.start, query.end, now, self.default_window);
        // Reject bad parameters before touching storage.
        bucketing::validate(start, end, &query.params)?;

        let samples = self.storage.find_data(&query.series_id, start, end)?;
        debug!(
            "fetched {} samples for {} in [{}, {})",
            samples.len(),
            query.series_id,
            start,
            end
        );

        let output = bucketing::aggregate(&query.series_id, start, end, &query.params, &samples)?;
        Ok(output)
    }
}
