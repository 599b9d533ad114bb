//! Fixed number of equal-width buckets spanning the query interval.

use crate::bucketing::stats::StatsAccumulator;
use crate::bucketing::{BucketPoint, BucketValue};
use crate::storage::Sample;

/// Split `[start, end)` into `buckets` sequential windows and reduce each one.
///
/// The width is `(end - start) / buckets` with integer truncation, so when the
/// span does not divide evenly the windows stop short of `end` and samples in
/// the remainder belong to no bucket. Samples before `start` are ignored too.
///
/// # Parameters
///
/// - `series_id` - Id stamped on every emitted point
/// - `start` - Start of the first window in milliseconds
/// - `end` - End of the query interval in milliseconds, greater than `start`
/// - `buckets` - Number of windows, at least one
/// - `skip_empty` - Drop windows without samples instead of emitting `NaN` stats
/// - `samples` - Samples of the series in any order
///
/// # Returns
///
/// Returns one point per window in ascending time order, stamped with the
/// window start.
pub fn bucket_fixed_count(
    series_id: &str,
    start: i64,
    end: i64,
    buckets: usize,
    skip_empty: bool,
    samples: &[Sample],
) -> Vec<BucketPoint> {
    // Unsigned span so the full i64 range cannot overflow.
    let width = end.abs_diff(start) / buckets as u64;
    let mut accs = vec![StatsAccumulator::default(); buckets];

    // Zero-width windows contain nothing.
    if width > 0 {
        for sample in samples.iter().filter(|s| s.timestamp >= start) {
            let index = sample.timestamp.abs_diff(start) / width;
            if let Some(acc) = usize::try_from(index).ok().and_then(|i| accs.get_mut(i)) {
                acc.push(sample.value);
            }
        }
    }

    // A window start never passes `end`, so the addition is exact.
    accs.iter()
        .enumerate()
        .map(|(i, acc)| (start.saturating_add_unsigned(i as u64 * width), acc.finish()))
        .filter(|(_, stats)| !(skip_empty && stats.is_empty()))
        .map(|(timestamp, stats)| BucketPoint {
            series_id: series_id.to_string(),
            timestamp,
            value: BucketValue::Stats(stats),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(i64, f64)]) -> Vec<Sample> {
        points.iter().map(|&(ts, v)| Sample::new("cpu", ts, v)).collect()
    }

    /// Test that each sample lands in exactly the window containing it.
    #[test]
    fn test_sample_lands_in_containing_window() {
        let points = bucket_fixed_count("cpu", 0, 100, 10, false, &samples(&[(55, 1.0), (99, 2.0)]));

        assert_eq!(points.len(), 10);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.timestamp, i as i64 * 10);
            assert_eq!(point.series_id, "cpu");
            match i {
                5 => assert_eq!(point.avg(), 1.0),
                9 => assert_eq!(point.avg(), 2.0),
                _ => assert!(point.is_empty()),
            }
        }
    }

    /// Test that window boundaries are half-open.
    #[test]
    fn test_window_boundaries() {
        let points =
            bucket_fixed_count("cpu", 0, 100, 10, false, &samples(&[(50, 1.0), (60, 3.0), (59, 2.0)]));
        assert_eq!(points[5].min(), 1.0);
        assert_eq!(points[5].max(), 2.0);
        assert_eq!(points[6].avg(), 3.0);
    }

    /// Test that the truncated remainder of an uneven span is dropped.
    #[test]
    fn test_truncated_remainder_excluded() {
        let points = bucket_fixed_count("cpu", 0, 105, 10, true, &samples(&[(95, 1.0), (102, 9.0)]));

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, 90);
        assert_eq!(points[0].max(), 1.0);
    }

    /// Test that windows are anchored at a non-zero start.
    #[test]
    fn test_offset_start() {
        let points = bucket_fixed_count(
            "cpu",
            1_000,
            2_000,
            4,
            true,
            &samples(&[(999, 100.0), (1_250, 1.0), (1_260, 3.0), (2_000, 100.0)]),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, 1_250);
        assert_eq!(points[0].avg(), 2.0);
    }

    /// Test that empty windows are emitted unless skipped.
    #[test]
    fn test_skip_empty() {
        let input = samples(&[(5, 1.0), (35, 2.0)]);

        let all = bucket_fixed_count("cpu", 0, 40, 4, false, &input);
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().filter(|p| p.is_empty()).count(), 2);

        let kept = bucket_fixed_count("cpu", 0, 40, 4, true, &input);
        let timestamps: Vec<i64> = kept.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![0, 30]);
    }

    /// Test that a span covering the whole i64 range buckets without overflow.
    #[test]
    fn test_full_i64_span() {
        let input = vec![
            Sample::new("cpu", 0, 1.0),
            Sample::new("cpu", i64::MIN, 2.0),
            Sample::new("cpu", i64::MAX - 1, 9.0),
        ];
        let points = bucket_fixed_count("cpu", i64::MIN, i64::MAX, 2, false, &input);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, i64::MIN);
        assert_eq!(points[0].avg(), 2.0);
        assert_eq!(points[1].timestamp, -1);
        // The truncated last millisecond of the span belongs to no window.
        assert_eq!((points[1].min(), points[1].max()), (1.0, 1.0));
    }

    /// Test a span wider than i64::MAX with a sample near the upper bound.
    #[test]
    fn test_span_beyond_i64_max() {
        let input = vec![Sample::new("cpu", i64::MAX - 1, 3.0)];
        let points = bucket_fixed_count("cpu", -2, i64::MAX, 1, false, &input);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, -2);
        assert_eq!(points[0].avg(), 3.0);
    }

    /// Test a span narrower than the bucket count: every window has zero width.
    #[test]
    fn test_zero_width_windows() {
        let points = bucket_fixed_count("cpu", 0, 3, 5, false, &samples(&[(0, 1.0), (1, 2.0)]));
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.is_empty() && p.timestamp == 0));
    }
}
