//! Ingest and query handlers for `/metrics`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::bucketing::QueryOutput;
use crate::http::state::AppState;
use crate::http::types::{
    BucketDataPointResponse, DataPointBody, DataPointResponse, DataQueryParams, ErrorResponse,
    IdDataPoint,
};
use crate::query_engine::QueryError;
use crate::storage::{Sample, StorageError};

/// Store one data point for series `id`.
///
/// # Parameters
///
/// - `state` - Application state containing the query engine
/// - `id` - Series id from the path
/// - `body` - Timestamp and value
///
/// # Returns
///
/// Returns 200 on success, or an error response.
pub async fn add_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DataPointBody>,
) -> Response {
    store(&state, vec![Sample::new(id, body.timestamp, body.value)])
}

/// Store a batch of data points, each carrying its own series id.
///
/// # Parameters
///
/// - `state` - Application state containing the query engine
/// - `body` - Data points to store
///
/// # Returns
///
/// Returns 200 on success, or an error response.
pub async fn add_metrics(
    State(state): State<AppState>,
    Json(body): Json<Vec<IdDataPoint>>,
) -> Response {
    store(&state, body.into_iter().map(Sample::from).collect())
}

/// Read the data of series `id`, raw or bucketed.
///
/// # Parameters
///
/// - `state` - Application state containing the query engine
/// - `id` - Series id from the path
/// - `params` - Time range and bucketing parameters
///
/// # Returns
///
/// Returns a JSON array of raw or bucket data points.
pub async fn get_data_for_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DataQueryParams>,
) -> Response {
    let query = params.into_query(id);
    match state.engine.query(&query, state.now_millis()) {
        Ok(output) => build_points_response(output),
        Err(e) => build_error_response(e),
    }
}

fn store(state: &AppState, samples: Vec<Sample>) -> Response {
    debug!("received {} data points", samples.len());
    match state.engine.add_data(samples) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => build_error_response(e),
    }
}

/// Serialize raw or bucketed points as a JSON array.
fn build_points_response(output: QueryOutput) -> Response {
    match output {
        QueryOutput::Raw(points) => {
            let body: Vec<DataPointResponse> = points.iter().map(DataPointResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        QueryOutput::Buckets(points) => {
            let body: Vec<BucketDataPointResponse> =
                points.iter().map(BucketDataPointResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

/// Build an error response for failed requests.
fn build_error_response(error: QueryError) -> Response {
    warn!("request failed: {}", error);

    let (status, error_type) = match &error {
        QueryError::Bucketing(_) | QueryError::Storage(StorageError::EmptySeriesId) => {
            (StatusCode::BAD_REQUEST, "bad_data")
        }
        QueryError::Storage(StorageError::Poisoned) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    };

    let body = ErrorResponse { status: "error", error_type, error: error.to_string() };
    (status, Json(body)).into_response()
}
