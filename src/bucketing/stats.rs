//! Min/avg/max reduction over the values that fall into one bucket.

/// Summary statistics of one bucket.
///
/// A bucket without contributing samples carries `NaN` in all three fields.
/// The sentinel keeps every aggregated point the same shape; it is rendered
/// as `null` only at the HTTP boundary.
#[derive(Debug, Clone, Copy)]
pub struct BucketStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl BucketStats {
    /// Statistics of a bucket with no samples.
    pub const EMPTY: Self = Self { min: f64::NAN, avg: f64::NAN, max: f64::NAN };

    /// Whether no samples contributed to this bucket.
    pub fn is_empty(&self) -> bool {
        self.min.is_nan()
    }
}

/// Running accumulator for [`BucketStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: usize,
}

impl StatsAccumulator {
    /// Add one value to the bucket.
    pub fn push(&mut self, value: f64) {
        if self.min.map_or(true, |min| value < min) {
            self.min = Some(value);
        }
        if self.max.map_or(true, |max| value > max) {
            self.max = Some(value);
        }
        self.sum += value;
        self.count += 1;
    }

    /// Close the bucket.
    ///
    /// # Returns
    ///
    /// Returns [`BucketStats::EMPTY`] when nothing was pushed, otherwise the
    /// exact extrema and the arithmetic mean.
    pub fn finish(&self) -> BucketStats {
        if self.count == 0 {
            return BucketStats::EMPTY;
        }
        BucketStats {
            min: self.min.unwrap_or(f64::NAN),
            avg: self.sum / self.count as f64,
            max: self.max.unwrap_or(f64::NAN),
        }
    }
}

/// Reduce a sequence of values to min/avg/max in one pass.
///
/// # Parameters
///
/// - `values` - Values of the samples in a bucket, in any order
///
/// # Returns
///
/// Returns the bucket statistics, all `NaN` for an empty input.
pub fn reduce(values: impl IntoIterator<Item = f64>) -> BucketStats {
    let mut acc = StatsAccumulator::default();
    for value in values {
        acc.push(value);
    }
    acc.finish()
}
