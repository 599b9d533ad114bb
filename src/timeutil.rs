//! Clock access and query window resolution.
//!
//! All timestamps handled by the crate are milliseconds since the Unix epoch.

use std::time::Duration;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Window queried when the caller gives no start (8 hours).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(8 * 60 * 60);

/// Current time in milliseconds, or the pinned time when one is configured.
///
/// # Parameters
///
/// - `fixed_now` - Optional fixed time for deterministic responses
///
/// # Returns
///
/// Returns milliseconds since the Unix epoch.
pub fn now_millis(fixed_now: Option<OffsetDateTime>) -> i64 {
    let now = fixed_now.unwrap_or_else(OffsetDateTime::now_utc);
    (now.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Fill in a missing start and end.
///
/// `end` defaults to `now` and `start` defaults to `end - window`; each default
/// is applied on its own, so an explicit start with no end still ends at `now`.
///
/// # Parameters
///
/// - `start` - Requested start in milliseconds
/// - `end` - Requested end in milliseconds
/// - `now` - Current time in milliseconds
/// - `window` - Look-back used for a missing start
///
/// # Returns
///
/// Returns the resolved `(start, end)` pair.
pub fn resolve_window(
    start: Option<i64>,
    end: Option<i64>,
    now: i64,
    window: Duration,
) -> (i64, i64) {
    let end = end.unwrap_or(now);
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    let start = start.unwrap_or_else(|| end.saturating_sub(window_ms));
    (start, end)
}

/// Parse an RFC3339 timestamp such as `2025-08-03T00:00:00Z`.
///
/// # Errors
///
/// Returns an error message if the input is not valid RFC3339.
pub fn parse_rfc3339(input: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(input.trim(), &Rfc3339).map_err(|e| format!("invalid datetime: {e}"))
}
