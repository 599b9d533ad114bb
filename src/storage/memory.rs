//! In-memory sample storage implementation.
//!
//! Keeps every series as a timestamp-sorted vector so range reads are two
//! binary searches and a copy.

use std::sync::RwLock;

use fnv::FnvHashMap;

use crate::storage::{Sample, Storage, StorageError};

/// In-memory storage keyed by series id.
pub struct MemoryStorage {
    /// Map from series id to its samples, sorted by timestamp
    series: RwLock<FnvHashMap<String, Vec<Sample>>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create a new empty in-memory storage.
    ///
    /// # Returns
    /// Returns a new `MemoryStorage` instance with no series.
    pub fn new() -> Self {
        Self { series: RwLock::new(FnvHashMap::default()) }
    }

    /// Insert keeping the series sorted; a sample at an existing timestamp replaces it.
    fn insert_sorted(samples: &mut Vec<Sample>, sample: Sample) {
        match samples.binary_search_by_key(&sample.timestamp, |s| s.timestamp) {
            Ok(pos) => samples[pos] = sample,
            Err(pos) => samples.insert(pos, sample),
        }
    }
}

impl Storage for MemoryStorage {
    fn add_data(&self, samples: Vec<Sample>) -> Result<(), StorageError> {
        if samples.iter().any(|s| s.series_id.is_empty()) {
            return Err(StorageError::EmptySeriesId);
        }

        let mut series = self.series.write().map_err(|_| StorageError::Poisoned)?;
        for sample in samples {
            let stored = series.entry(sample.series_id.clone()).or_default();
            Self::insert_sorted(stored, sample);
        }
        Ok(())
    }

    fn find_data(&self, series_id: &str, start: i64, end: i64) -> Result<Vec<Sample>, StorageError> {
        let series = self.series.read().map_err(|_| StorageError::Poisoned)?;
        let Some(samples) = series.get(series_id) else {
            return Ok(Vec::new());
        };

        let lo = samples.partition_point(|s| s.timestamp < start);
        let hi = samples.partition_point(|s| s.timestamp < end).max(lo);
        Ok(samples[lo..hi].to_vec())
    }
}
