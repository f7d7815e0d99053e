//! Type definitions for FFI.

use sqlbridge_core::{Config, StatsSnapshot};

/// Handle value as seen by foreign callers. `0` means failure.
pub type SqlBridgeHandle = i64;

/// Configuration passed to `sqlbridge_init`.
///
/// Zero limits mean unlimited; a zero shard count falls back to the default.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlBridgeConfig {
    /// Number of registry shards.
    pub shard_count: u32,
    /// Maximum live connections.
    pub max_connections: u64,
    /// Maximum live results.
    pub max_results: u64,
    /// Maximum live prepared statements.
    pub max_statements: u64,
}

impl SqlBridgeConfig {
    /// Converts to the core configuration.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new()
            .max_connections(to_usize(self.max_connections))
            .max_results(to_usize(self.max_results))
            .max_statements(to_usize(self.max_statements));
        if self.shard_count > 0 {
            config = config.shard_count(self.shard_count as usize);
        }
        config
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Bridge statistics written by `sqlbridge_stats`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlBridgeStats {
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

impl From<StatsSnapshot> for SqlBridgeStats {
    fn from(s: StatsSnapshot) -> Self {
        Self {
            connections_opened: s.connections_opened,
            connections_closed: s.connections_closed,
            queries: s.queries,
            non_queries: s.non_queries,
            prepared_executions: s.prepared_executions,
            results_freed: s.results_freed,
            driver_errors: s.driver_errors,
            unknown_handles: s.unknown_handles,
            live_connections: s.live_connections,
            live_results: s.live_results,
            live_statements: s.live_statements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbridge_core::DEFAULT_SHARD_COUNT;

    #[test]
    fn zeroed_config_is_default() {
        let config = SqlBridgeConfig::default().to_config();
        assert_eq!(config.shard_count, DEFAULT_SHARD_COUNT);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.max_results, 0);
    }

    #[test]
    fn config_conversion() {
        let config = SqlBridgeConfig {
            shard_count: 2,
            max_connections: 3,
            max_results: 4,
            max_statements: 5,
        }
        .to_config();
        assert_eq!(config.shard_count, 2);
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.max_results, 4);
        assert_eq!(config.max_statements, 5);
    }

    #[test]
    fn stats_from_snapshot() {
        let snapshot = StatsSnapshot {
            queries: 3,
            live_results: 2,
            ..StatsSnapshot::default()
        };
        let stats = SqlBridgeStats::from(snapshot);
        assert_eq!(stats.queries, 3);
        assert_eq!(stats.live_results, 2);
        assert_eq!(stats.connections_opened, 0);
    }
}
