//! Bridge statistics.
//!
//! Counters are atomic and can be read while operations are in progress.
//!
//! ```rust
//! use sqlbridge_core::{Bridge, MemoryDriver};
//!
//! let bridge = Bridge::new(MemoryDriver::new());
//! let conn = bridge.create_connection("memory://stats");
//! bridge.close_connection(conn);
//!
//! let stats = bridge.stats();
//! assert_eq!(stats.connections_opened, 1);
//! assert_eq!(stats.connections_closed, 1);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one bridge.
#[derive(Debug, Default)]
pub struct BridgeStats {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    queries: AtomicU64,
    non_queries: AtomicU64,
    prepared_executions: AtomicU64,
    results_freed: AtomicU64,
    driver_errors: AtomicU64,
    unknown_handles: AtomicU64,
}

impl BridgeStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_non_query(&self) {
        self.non_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_prepared_execution(&self) {
        self.prepared_executions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_result_freed(&self) {
        self.results_freed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_driver_error(&self) {
        self.driver_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_handle(&self) {
        self.unknown_handles.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of connections opened.
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened.load(Ordering::Relaxed)
    }

    /// Returns the number of connections closed.
    pub fn connections_closed(&self) -> u64 {
        self.connections_closed.load(Ordering::Relaxed)
    }

    /// Returns the number of queries that produced a result.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the number of successful non-query statements.
    pub fn non_queries(&self) -> u64 {
        self.non_queries.load(Ordering::Relaxed)
    }

    /// Returns the number of successful prepared statement executions.
    pub fn prepared_executions(&self) -> u64 {
        self.prepared_executions.load(Ordering::Relaxed)
    }

    /// Returns the number of results freed.
    pub fn results_freed(&self) -> u64 {
        self.results_freed.load(Ordering::Relaxed)
    }

    /// Returns the number of driver failures.
    pub fn driver_errors(&self) -> u64 {
        self.driver_errors.load(Ordering::Relaxed)
    }

    /// Returns how often an unknown handle was supplied.
    ///
    /// Close and free of unknown handles are not counted; they are
    /// legitimate no-ops.
    pub fn unknown_handles(&self) -> u64 {
        self.unknown_handles.load(Ordering::Relaxed)
    }
}

/// A point-in-time copy of the counters plus live resource gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Connections opened.
    pub connections_opened: u64,
    /// Connections closed.
    pub connections_closed: u64,
    /// Queries that produced a result.
    pub queries: u64,
    /// Successful non-query statements.
    pub non_queries: u64,
    /// Successful prepared statement executions.
    pub prepared_executions: u64,
    /// Results freed.
    pub results_freed: u64,
    /// Driver failures.
    pub driver_errors: u64,
    /// Unknown handles supplied by callers.
    pub unknown_handles: u64,
    /// Connections currently live.
    pub live_connections: u64,
    /// Results currently live.
    pub live_results: u64,
    /// Prepared statements currently live.
    pub live_statements: u64,
}

impl StatsSnapshot {
    pub(crate) fn capture(stats: &BridgeStats, live: [usize; 3]) -> Self {
        Self {
            connections_opened: stats.connections_opened(),
            connections_closed: stats.connections_closed(),
            queries: stats.queries(),
            non_queries: stats.non_queries(),
            prepared_executions: stats.prepared_executions(),
            results_freed: stats.results_freed(),
            driver_errors: stats.driver_errors(),
            unknown_handles: stats.unknown_handles(),
            live_connections: live[0] as u64,
            live_results: live[1] as u64,
            live_statements: live[2] as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = BridgeStats::new();
        assert_eq!(stats.connections_opened(), 0);
        assert_eq!(stats.queries(), 0);
        assert_eq!(stats.unknown_handles(), 0);
    }

    #[test]
    fn snapshot_copies_counters() {
        let stats = BridgeStats::new();
        stats.record_connection_opened();
        stats.record_connection_opened();
        stats.record_query();
        stats.record_driver_error();

        let snap = StatsSnapshot::capture(&stats, [2, 1, 0]);
        assert_eq!(snap.connections_opened, 2);
        assert_eq!(snap.queries, 1);
        assert_eq!(snap.driver_errors, 1);
        assert_eq!(snap.live_connections, 2);
        assert_eq!(snap.live_results, 1);
        assert_eq!(snap.live_statements, 0);
    }
}
