//! Command-line interface definitions for the metrics server.

use clap::Parser;
use time::OffsetDateTime;

use bucketed_metrics::timeutil::parse_rfc3339;

/// Command-line arguments for the metrics server.
#[derive(Debug, Parser)]
#[command(name = "bucketed-metrics")]
#[command(
    author,
    version,
    about = "Time-series metric store with raw, fixed-count and wraparound bucketed queries"
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Fixed "now" time (ISO-8601, e.g. 2025-08-03T00:00:00Z)
    #[arg(long, value_parser = parse_rfc3339)]
    pub fixed_now: Option<OffsetDateTime>,

    /// Window queried when a request has no start (e.g. 8h, 30m)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "8h")]
    pub default_window: std::time::Duration,
}
