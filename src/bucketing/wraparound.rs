//! Fixed-width buckets that wrap around a repeating cycle.
//!
//! The cycle is `buckets * width_ms` long and starts at the earliest sample.
//! Every sample is folded into the cycle with a modulo, so a range covering
//! many cycles (thirty days, say) is overlaid onto one representative cycle
//! (a typical day of hourly buckets). Emitted timestamps are offsets into
//! the cycle, not absolute times.

use crate::bucketing::stats::reduce;
use crate::bucketing::{BucketPoint, BucketValue};
use crate::storage::Sample;

/// Geometry of a wraparound bucket scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    buckets: usize,
    width_ms: u64,
}

impl Cycle {
    /// Create a cycle of `buckets` buckets, each `width_ms` milliseconds wide.
    ///
    /// # Returns
    ///
    /// Returns `None` if either argument is zero or the cycle length
    /// overflows.
    pub fn new(buckets: usize, width_ms: u64) -> Option<Self> {
        if buckets == 0 || width_ms == 0 {
            return None;
        }
        let cycle = Self { buckets, width_ms };
        cycle.length_ms().map(|_| cycle)
    }

    /// Number of buckets in one cycle.
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Total length of one cycle in milliseconds, if it fits an `i64`.
    pub fn length_ms(&self) -> Option<u64> {
        let length = u64::try_from(self.buckets).ok()?.checked_mul(self.width_ms)?;
        i64::try_from(length).ok().map(|_| length)
    }

    /// Bucket index of `timestamp` in the cycle anchored at `min_ts`.
    ///
    /// Takes the offset modulo the cycle length first and divides by the
    /// bucket width second.
    pub fn index_of(&self, timestamp: i64, min_ts: i64) -> usize {
        let length = self.buckets as u64 * self.width_ms;
        let offset = timestamp.abs_diff(min_ts) % length;
        (offset / self.width_ms) as usize
    }

    /// Offset of bucket `index` from the start of the cycle.
    fn bucket_offset(&self, index: usize) -> i64 {
        (index as u64 * self.width_ms) as i64
    }
}

/// Fold samples into the cycle and emit one point per bucket or per sample.
///
/// # Parameters
///
/// - `series_id` - Id stamped on every emitted point
/// - `cycle` - Bucket count and width
/// - `cluster` - Reduce each bucket to min/avg/max when `true`, otherwise emit
///   every sample as its own point tagged with its bucket offset
/// - `skip_empty` - Drop buckets without samples (clustered mode only)
/// - `samples` - Samples of the series in any order
///
/// # Returns
///
/// Returns points in ascending bucket order. Within a bucket in declustered
/// mode, samples keep their input order.
pub fn bucket_wraparound(
    series_id: &str,
    cycle: Cycle,
    cluster: bool,
    skip_empty: bool,
    samples: &[Sample],
) -> Vec<BucketPoint> {
    let mut slots: Vec<Vec<&Sample>> = vec![Vec::new(); cycle.buckets()];
    if let Some(min_ts) = samples.iter().map(|s| s.timestamp).min() {
        for sample in samples {
            slots[cycle.index_of(sample.timestamp, min_ts)].push(sample);
        }
    }

    let point = |index: usize, value: BucketValue| BucketPoint {
        series_id: series_id.to_string(),
        timestamp: cycle.bucket_offset(index),
        value,
    };

    if cluster {
        slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (i, reduce(slot.iter().map(|s| s.value))))
            .filter(|(_, stats)| !(skip_empty && stats.is_empty()))
            .map(|(i, stats)| point(i, BucketValue::Stats(stats)))
            .collect()
    } else {
        slots
            .iter()
            .enumerate()
            .flat_map(|(i, slot)| slot.iter().map(move |s| (i, s.value)))
            .map(|(i, value)| point(i, BucketValue::Raw(value)))
            .collect()
    }
}
