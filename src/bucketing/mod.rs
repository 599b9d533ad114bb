//! Bucketing and aggregation of raw samples.
//!
//! [`aggregate`] is the single dispatch point. Depending on the requested
//! bucket count and width it either echoes the raw series, splits the query
//! interval into a fixed number of windows, or folds all samples onto a
//! repeating cycle of fixed-width buckets. Every strategy is a pure function
//! of its parameters and the samples; nothing is shared between calls.

pub mod fixed_count;
pub mod stats;
pub mod wraparound;

pub use fixed_count::bucket_fixed_count;
pub use stats::{reduce, BucketStats, StatsAccumulator};
pub use wraparound::{bucket_wraparound, Cycle};

use thiserror::Error;

use crate::storage::Sample;

/// Upper bound on buckets per query; each bucket costs an allocation.
pub const MAX_BUCKETS: i64 = 1 << 20;

const MILLIS_PER_SECOND: u64 = 1000;

/// Errors raised for bucketing parameters that cannot produce meaningful output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketingError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Caller-supplied bucketing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketingParams {
    /// Zero requests the raw series
    pub number_of_buckets: i64,
    /// Zero selects fixed-count buckets, positive selects wraparound buckets
    pub bucket_width_seconds: i64,
    /// Drop buckets that received no samples
    pub skip_empty: bool,
    /// Reduce wraparound buckets to statistics instead of emitting raw values
    pub cluster: bool,
}

impl Default for BucketingParams {
    fn default() -> Self {
        Self { number_of_buckets: 0, bucket_width_seconds: 0, skip_empty: false, cluster: true }
    }
}

/// Strategy selected from [`BucketingParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketingMode {
    Raw,
    FixedCount { buckets: usize },
    Wraparound(Cycle),
}

impl BucketingParams {
    /// Validate the parameters and pick the strategy.
    ///
    /// # Errors
    ///
    /// Returns `BucketingError::InvalidParameter` for negative values, a bucket
    /// count above [`MAX_BUCKETS`], or a cycle length that overflows.
    pub fn mode(&self) -> Result<BucketingMode, BucketingError> {
        if self.number_of_buckets < 0 {
            return Err(invalid(format!(
                "buckets must not be negative, got {}",
                self.number_of_buckets
            )));
        }
        if self.bucket_width_seconds < 0 {
            return Err(invalid(format!(
                "bucketWidthSeconds must not be negative, got {}",
                self.bucket_width_seconds
            )));
        }
        if self.number_of_buckets > MAX_BUCKETS {
            return Err(invalid(format!(
                "buckets must be at most {MAX_BUCKETS}, got {}",
                self.number_of_buckets
            )));
        }

        // Both values are non-negative and bounded from here on.
        let buckets = self.number_of_buckets as usize;
        if buckets == 0 {
            return Ok(BucketingMode::Raw);
        }
        if self.bucket_width_seconds == 0 {
            return Ok(BucketingMode::FixedCount { buckets });
        }

        (self.bucket_width_seconds as u64)
            .checked_mul(MILLIS_PER_SECOND)
            .and_then(|width_ms| Cycle::new(buckets, width_ms))
            .map(BucketingMode::Wraparound)
            .ok_or_else(|| {
                invalid(format!(
                    "{} buckets of {}s overflow the cycle length",
                    self.number_of_buckets, self.bucket_width_seconds
                ))
            })
    }
}

fn invalid(message: String) -> BucketingError {
    BucketingError::InvalidParameter(message)
}

/// A raw sample passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub series_id: String,
    pub timestamp: i64,
    pub value: f64,
}

impl From<&Sample> for DataPoint {
    fn from(sample: &Sample) -> Self {
        Self { series_id: sample.series_id.clone(), timestamp: sample.timestamp, value: sample.value }
    }
}

/// What a bucket point carries.
#[derive(Debug, Clone, Copy)]
pub enum BucketValue {
    /// Reduced statistics of every sample in the bucket
    Stats(BucketStats),
    /// One unreduced sample value tagged with its bucket (declustered wraparound)
    Raw(f64),
}

/// One output point of a bucketed query.
#[derive(Debug, Clone)]
pub struct BucketPoint {
    pub series_id: String,
    /// Bucket start; an offset into the cycle for wraparound buckets
    pub timestamp: i64,
    pub value: BucketValue,
}

impl BucketPoint {
    pub fn min(&self) -> f64 {
        match self.value {
            BucketValue::Stats(stats) => stats.min,
            BucketValue::Raw(_) => f64::NAN,
        }
    }

    /// Mean of the bucket, or the sample value for a raw point.
    pub fn avg(&self) -> f64 {
        match self.value {
            BucketValue::Stats(stats) => stats.avg,
            BucketValue::Raw(value) => value,
        }
    }

    pub fn max(&self) -> f64 {
        match self.value {
            BucketValue::Stats(stats) => stats.max,
            BucketValue::Raw(_) => f64::NAN,
        }
    }

    /// The unreduced value of a declustered point.
    pub fn raw_value(&self) -> Option<f64> {
        match self.value {
            BucketValue::Stats(_) => None,
            BucketValue::Raw(value) => Some(value),
        }
    }

    /// Whether this is an aggregated bucket without samples. Raw points are never empty.
    pub fn is_empty(&self) -> bool {
        match self.value {
            BucketValue::Stats(stats) => stats.is_empty(),
            BucketValue::Raw(_) => false,
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    /// No bucketing requested
    Raw(Vec<DataPoint>),
    /// Fixed-count or wraparound buckets
    Buckets(Vec<BucketPoint>),
}

impl QueryOutput {
    /// Number of emitted points.
    pub fn len(&self) -> usize {
        match self {
            Self::Raw(points) => points.len(),
            Self::Buckets(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check the query interval and parameters without running a strategy.
///
/// # Errors
///
/// Returns `BucketingError::InvalidParameter` when `end <= start`, when
/// `end - start` overflows an `i64`, or when the parameters are rejected by
/// [`BucketingParams::mode`].
pub fn validate(
    start: i64,
    end: i64,
    params: &BucketingParams,
) -> Result<BucketingMode, BucketingError> {
    if end <= start {
        return Err(invalid(format!("end ({end}) must be after start ({start})")));
    }
    if end.checked_sub(start).is_none() {
        return Err(invalid(format!("interval [{start}, {end}) is too long")));
    }
    params.mode()
}

/// Reshape the samples of one series according to `params`.
///
/// # Parameters
///
/// - `series_id` - Series the samples belong to
/// - `start` - Start of the query interval in milliseconds
/// - `end` - End of the query interval in milliseconds
/// - `params` - Bucketing parameters
/// - `samples` - Samples returned by storage for the interval, in any order
///
/// # Returns
///
/// Returns raw points when `number_of_buckets` is zero, fixed-count buckets
/// when `bucket_width_seconds` is zero, and wraparound buckets otherwise.
///
/// # Errors
///
/// Returns `BucketingError::InvalidParameter` when [`validate`] fails.
pub fn aggregate(
    series_id: &str,
    start: i64,
    end: i64,
    params: &BucketingParams,
    samples: &[Sample],
) -> Result<QueryOutput, BucketingError> {
    let output = match validate(start, end, params)? {
        BucketingMode::Raw => QueryOutput::Raw(samples.iter().map(DataPoint::from).collect()),
        BucketingMode::FixedCount { buckets } => QueryOutput::Buckets(bucket_fixed_count(
            series_id,
            start,
            end,
            buckets,
            params.skip_empty,
            samples,
        )),
        BucketingMode::Wraparound(cycle) => QueryOutput::Buckets(bucket_wraparound(
            series_id,
            cycle,
            params.cluster,
            params.skip_empty,
            samples,
        )),
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn params(buckets: i64, width: i64) -> BucketingParams {
        BucketingParams {
            number_of_buckets: buckets,
            bucket_width_seconds: width,
            ..BucketingParams::default()
        }
    }

    /// Test dispatch from bucket count and width to a strategy.
    #[test]
    fn test_mode_dispatch() {
        assert_eq!(params(0, 0).mode(), Ok(BucketingMode::Raw));
        assert_eq!(params(0, 60).mode(), Ok(BucketingMode::Raw));
        assert_eq!(params(12, 0).mode(), Ok(BucketingMode::FixedCount { buckets: 12 }));
        assert_eq!(
            params(24, 3600).mode(),
            Ok(BucketingMode::Wraparound(Cycle::new(24, 3_600_000).expect("valid cycle")))
        );
    }

    /// Test that negative and oversized parameters are rejected.
    #[test]
    fn test_mode_rejects_invalid() {
        assert!(matches!(params(-1, 0).mode(), Err(BucketingError::InvalidParameter(_))));
        assert!(matches!(params(3, -10).mode(), Err(BucketingError::InvalidParameter(_))));
        assert!(matches!(params(MAX_BUCKETS + 1, 0).mode(), Err(BucketingError::InvalidParameter(_))));
        assert!(matches!(params(2, i64::MAX).mode(), Err(BucketingError::InvalidParameter(_))));
    }

    /// Test that an empty or inverted interval is rejected.
    #[test]
    fn test_aggregate_rejects_inverted_interval() {
        let samples = vec![Sample::new("cpu", 5, 1.0)];
        assert!(aggregate("cpu", 10, 10, &params(0, 0), &samples).is_err());
        assert!(aggregate("cpu", 10, 5, &params(2, 0), &samples).is_err());
    }

    /// Test that an interval longer than i64::MAX milliseconds is rejected.
    #[test]
    fn test_aggregate_rejects_overflowing_interval() {
        let fixed = params(2, 0);

        let result = aggregate("cpu", i64::MIN, i64::MAX, &fixed, &[Sample::new("cpu", 0, 1.0)]);
        assert!(matches!(result, Err(BucketingError::InvalidParameter(_))));

        let result =
            aggregate("cpu", -2, i64::MAX, &params(1, 0), &[Sample::new("cpu", i64::MAX - 1, 1.0)]);
        assert!(matches!(result, Err(BucketingError::InvalidParameter(_))));

        // The longest representable span is still accepted.
        let output = aggregate("cpu", i64::MIN, -1, &fixed, &[Sample::new("cpu", -2, 1.0)])
            .expect("span fits in i64");
        assert_eq!(output.len(), 2);
    }

    /// Test that fixed-count buckets are selected when no width is given.
    #[test]
    fn test_aggregate_fixed_count() {
        let samples = vec![Sample::new("cpu", 55, 1.0), Sample::new("cpu", 99, 2.0)];
        let output = aggregate("cpu", 0, 100, &params(10, 0), &samples).expect("valid params");

        let QueryOutput::Buckets(points) = output else {
            panic!("expected buckets");
        };
        assert_eq!(points.len(), 10);
        assert_eq!(points[5].avg(), 1.0);
        assert_eq!(points[9].avg(), 2.0);
    }

    /// Test that wraparound buckets honor both flags.
    #[test]
    fn test_aggregate_wraparound_flags() {
        let samples =
            vec![Sample::new("cpu", 1_000, 1.0), Sample::new("cpu", 11_000, 2.0), Sample::new("cpu", 36_000, 3.0)];

        let skip = BucketingParams { skip_empty: true, ..params(3, 10) };
        let output = aggregate("cpu", 0, 100_000, &skip, &samples).expect("valid params");
        let QueryOutput::Buckets(points) = output else {
            panic!("expected buckets");
        };
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| !p.is_empty()));

        let raw = BucketingParams { cluster: false, ..params(3, 10) };
        let output = aggregate("cpu", 0, 100_000, &raw, &samples).expect("valid params");
        let QueryOutput::Buckets(points) = output else {
            panic!("expected buckets");
        };
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.raw_value().is_some()));
    }

    /// Test the accessors of raw and aggregated points.
    #[test]
    fn test_bucket_point_accessors() {
        let raw = BucketPoint { series_id: "cpu".into(), timestamp: 0, value: BucketValue::Raw(4.0) };
        assert!(raw.min().is_nan());
        assert_eq!(raw.avg(), 4.0);
        assert!(raw.max().is_nan());
        assert!(!raw.is_empty());

        let empty =
            BucketPoint { series_id: "cpu".into(), timestamp: 0, value: BucketValue::Stats(BucketStats::EMPTY) };
        assert!(empty.is_empty());
        assert_eq!(empty.raw_value(), None);
    }

    proptest! {
        /// Test that raw mode returns every sample unchanged and in input order.
        #[test]
        fn prop_raw_mode_identity(
            points in prop::collection::vec((0i64..1_000_000, -1e6..1e6f64), 0..100)
        ) {
            let samples: Vec<Sample> =
                points.iter().map(|&(ts, v)| Sample::new("cpu", ts, v)).collect();
            let output = aggregate("cpu", 0, 1_000_000, &BucketingParams::default(), &samples)
                .expect("valid params");

            let QueryOutput::Raw(raw) = output else {
                panic!("expected raw points");
            };
            prop_assert_eq!(raw.len(), samples.len());
            for (point, sample) in raw.iter().zip(&samples) {
                prop_assert_eq!(point.timestamp, sample.timestamp);
                prop_assert_eq!(point.value, sample.value);
                prop_assert_eq!(&point.series_id, &sample.series_id);
            }
        }

        /// Test that skip_empty never lets an empty bucket through.
        #[test]
        fn prop_skip_empty_suppresses(
            timestamps in prop::collection::vec(0i64..10_000, 0..50),
            buckets in 1i64..20,
            width in 0i64..5,
        ) {
            let samples: Vec<Sample> =
                timestamps.iter().map(|&ts| Sample::new("cpu", ts, 1.0)).collect();
            let skip = BucketingParams { skip_empty: true, ..params(buckets, width) };
            let output = aggregate("cpu", 0, 10_000, &skip, &samples).expect("valid params");

            let QueryOutput::Buckets(points) = output else {
                panic!("expected buckets");
            };
            prop_assert!(points.iter().all(|p| !p.is_empty()));
        }
    }
}
