//! Raw sample storage abstractions and implementations.
//!
//! The bucketing engine never talks to storage itself. The query engine
//! fetches a materialized range of samples through the [`Storage`] trait and
//! hands them over once the fetch has completed.

pub mod memory;

// Re-export main implementations
pub use memory::MemoryStorage;

use fnv::FnvHashSet;
use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A sample was submitted without a series id.
    #[error("series id must not be empty")]
    EmptySeriesId,
    /// The backend's internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Storage abstraction for storing and retrieving raw samples.
///
/// Each call completes exactly once with either the full result or an error;
/// there is no partial or streaming delivery.
pub trait Storage: Send + Sync {
    /// Store a batch of samples.
    ///
    /// # Parameters
    ///
    /// - `samples` - Samples to store, possibly spanning several series
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any sample is rejected or the backend fails.
    fn add_data(&self, samples: Vec<Sample>) -> Result<(), StorageError>;

    /// Fetch all samples of one series whose timestamp lies in `[start, end)`.
    ///
    /// # Parameters
    ///
    /// - `series_id` - Series to read
    /// - `start` - Start timestamp in milliseconds (inclusive)
    /// - `end` - End timestamp in milliseconds (exclusive)
    ///
    /// # Returns
    ///
    /// Returns the matching samples sorted by timestamp, or an empty vector
    /// for an unknown series.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn find_data(&self, series_id: &str, start: i64, end: i64) -> Result<Vec<Sample>, StorageError>;
}

/// One raw reading of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub series_id: String,
    /// Milliseconds since Unix epoch
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    ///
    /// # Parameters
    ///
    /// - `series_id` - Series the reading belongs to
    /// - `timestamp` - Timestamp in milliseconds since Unix epoch
    /// - `value` - Measured value
    ///
    /// # Returns
    ///
    /// Returns a new `Sample` instance.
    pub fn new(series_id: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self { series_id: series_id.into(), timestamp, value }
    }

    /// Identity used for ingest de-duplication. Values compare by bit pattern.
    fn identity(&self) -> (String, i64, u64) {
        (self.series_id.clone(), self.timestamp, self.value.to_bits())
    }
}

/// Drop exact duplicates (same id, timestamp and value), keeping first-seen order.
///
/// # Parameters
///
/// - `samples` - Submitted samples
///
/// # Returns
///
/// Returns the samples with duplicates removed.
pub fn dedup_samples(samples: Vec<Sample>) -> Vec<Sample> {
    let mut seen = FnvHashSet::with_capacity_and_hasher(samples.len(), Default::default());
    samples.into_iter().filter(|s| seen.insert(s.identity())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that exact duplicates are removed and distinct values survive.
    #[test]
    fn test_dedup_samples() {
        let samples = vec![
            Sample::new("cpu", 1000, 1.0),
            Sample::new("cpu", 1000, 1.0),
            Sample::new("cpu", 1000, 2.0),
            Sample::new("mem", 1000, 1.0),
            Sample::new("cpu", 2000, 1.0),
        ];

        let unique = dedup_samples(samples);
        assert_eq!(unique.len(), 4);
        assert_eq!(unique[0], Sample::new("cpu", 1000, 1.0));
        assert_eq!(unique[1], Sample::new("cpu", 1000, 2.0));
        assert_eq!(unique[2], Sample::new("mem", 1000, 1.0));
    }

    /// Test that NaN readings de-duplicate by bit pattern.
    #[test]
    fn test_dedup_nan_values() {
        let samples = vec![Sample::new("cpu", 1, f64::NAN), Sample::new("cpu", 1, f64::NAN)];
        assert_eq!(dedup_samples(samples).len(), 1);
    }
}
