//! Wire types for the HTTP API.
//!
//! Timestamps are milliseconds since the Unix epoch. Statistics that are
//! `NaN` internally are written as JSON `null`.

use serde::{Deserialize, Serialize};

use crate::bucketing::{BucketPoint, BucketingParams, DataPoint};
use crate::query_engine::MetricQuery;
use crate::storage::Sample;

/// Body of `POST /metrics/{id}`.
#[derive(Debug, Deserialize)]
pub struct DataPointBody {
    pub timestamp: i64,
    pub value: f64,
}

/// Element of the body of `POST /metrics`.
#[derive(Debug, Deserialize)]
pub struct IdDataPoint {
    pub id: String,
    pub timestamp: i64,
    pub value: f64,
}

impl From<IdDataPoint> for Sample {
    fn from(point: IdDataPoint) -> Self {
        Sample::new(point.id, point.timestamp, point.value)
    }
}

/// Query parameters for `GET /metrics/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryParams {
    /// Start time in milliseconds
    pub start: Option<i64>,
    /// End time in milliseconds
    pub end: Option<i64>,
    /// Number of buckets, zero for raw data
    #[serde(default)]
    pub buckets: i64,
    /// Width of a wraparound bucket, zero for fixed-count buckets
    #[serde(default)]
    pub bucket_width_seconds: i64,
    #[serde(default)]
    pub skip_empty: bool,
    #[serde(default = "default_bucket_cluster")]
    pub bucket_cluster: bool,
}

fn default_bucket_cluster() -> bool {
    true
}

impl DataQueryParams {
    /// Build the engine query for series `id`.
    pub fn into_query(self, id: String) -> MetricQuery {
        MetricQuery::new(id).with_range(self.start, self.end).with_params(BucketingParams {
            number_of_buckets: self.buckets,
            bucket_width_seconds: self.bucket_width_seconds,
            skip_empty: self.skip_empty,
            cluster: self.bucket_cluster,
        })
    }
}

/// Raw data point in a response.
#[derive(Debug, Serialize)]
pub struct DataPointResponse {
    pub timestamp: i64,
    pub value: f64,
}

impl From<&DataPoint> for DataPointResponse {
    fn from(point: &DataPoint) -> Self {
        Self { timestamp: point.timestamp, value: point.value }
    }
}

/// Bucket data point in a response.
#[derive(Debug, Serialize)]
pub struct BucketDataPointResponse {
    pub id: String,
    pub timestamp: i64,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    /// Present only on declustered points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub empty: bool,
}

impl From<&BucketPoint> for BucketDataPointResponse {
    fn from(point: &BucketPoint) -> Self {
        Self {
            id: point.series_id.clone(),
            timestamp: point.timestamp,
            min: point.min(),
            avg: point.avg(),
            max: point.max(),
            value: point.raw_value(),
            empty: point.is_empty(),
        }
    }
}

/// Error body returned for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    /// Always "error"
    pub status: &'a str,
    #[serde(rename = "errorType")]
    pub error_type: &'a str,
    pub error: String,
}
