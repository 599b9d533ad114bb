//! # Bucketed Metrics Server
//!
//! Serves the in-memory metric store over HTTP.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use bucketed_metrics::http::{build_router, AppState};
use bucketed_metrics::storage::MemoryStorage;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let storage = Arc::new(MemoryStorage::new());

    let mut builder =
        AppState::builder().with_storage(storage).with_default_window(cli.default_window);

    if let Some(fixed_time) = cli.fixed_now {
        builder = builder.with_fixed_now(fixed_time);
    }

    let state = builder.build()?;

    let app = build_router(state);

    let addr: SocketAddr = cli.listen.parse().map_err(io::Error::other)?;
    tracing::info!(
        "starting bucketed-metrics on http://{addr} (default window {})",
        humantime::format_duration(cli.default_window)
    );
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
