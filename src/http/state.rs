//! Application state and configuration for the HTTP server.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::query_engine::QueryEngine;
use crate::storage::Storage;
use crate::timeutil::DEFAULT_WINDOW;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Engine for ingest and bucketed queries
    pub engine: QueryEngine,
    /// Fixed timestamp for deterministic responses (testing only)
    pub fixed_now: Option<time::OffsetDateTime>,
}

impl AppState {
    /// Create new application state.
    ///
    /// # Parameters
    ///
    /// - `storage` - Storage implementation for samples
    /// - `default_window` - Look-back used when a query has no start
    /// - `fixed_now` - Optional fixed timestamp for deterministic testing
    ///
    /// # Returns
    ///
    /// Returns configured `AppState` instance.
    pub fn new(
        storage: Arc<dyn Storage>,
        default_window: Duration,
        fixed_now: Option<time::OffsetDateTime>,
    ) -> Self {
        let engine = QueryEngine::new(storage).with_default_window(default_window);
        Self { engine, fixed_now }
    }

    /// Get a builder for configuring application state step by step.
    ///
    /// # Returns
    ///
    /// Returns an `AppStateBuilder` for fluent configuration.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Current time in milliseconds, honoring `fixed_now`.
    pub fn now_millis(&self) -> i64 {
        crate::timeutil::now_millis(self.fixed_now)
    }
}

/// Builder for constructing AppState with fluent interface.
#[derive(Default)]
pub struct AppStateBuilder {
    storage: Option<Arc<dyn Storage>>,
    default_window: Option<Duration>,
    fixed_now: Option<time::OffsetDateTime>,
}

impl AppStateBuilder {
    /// Create a new builder with default values.
    ///
    /// # Returns
    ///
    /// Returns a new `AppStateBuilder` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage implementation.
    ///
    /// # Parameters
    ///
    /// - `storage` - Storage implementation to use
    ///
    /// # Returns
    ///
    /// Returns the builder for method chaining.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the look-back used when a query has no start.
    ///
    /// # Parameters
    ///
    /// - `window` - Default query window
    ///
    /// # Returns
    ///
    /// Returns the builder for method chaining.
    pub fn with_default_window(mut self, window: Duration) -> Self {
        self.default_window = Some(window);
        self
    }

    /// Set a fixed timestamp for deterministic testing.
    ///
    /// # Parameters
    ///
    /// - `fixed_now` - Fixed timestamp to use
    ///
    /// # Returns
    ///
    /// Returns the builder for method chaining.
    pub fn with_fixed_now(mut self, fixed_now: time::OffsetDateTime) -> Self {
        self.fixed_now = Some(fixed_now);
        self
    }

    /// Build the final AppState with validation.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AppState)` if valid.
    ///
    /// # Errors
    ///
    /// Returns error if storage is not provided or the default window is zero.
    pub fn build(self) -> io::Result<AppState> {
        let storage = self.storage.ok_or(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Storage is required for AppState",
        ))?;

        let default_window = self.default_window.unwrap_or(DEFAULT_WINDOW);
        if default_window.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Default window must be greater than zero",
            ));
        }

        Ok(AppState::new(storage, default_window, self.fixed_now))
    }
}
