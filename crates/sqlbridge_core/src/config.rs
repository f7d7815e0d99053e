//! Bridge configuration.

use crate::registry::DEFAULT_SHARD_COUNT;

/// Configuration for a [`crate::Bridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of independently locked shards per registry.
    pub shard_count: usize,

    /// Maximum number of live connections (0 = unlimited).
    pub max_connections: usize,

    /// Maximum number of live results (0 = unlimited).
    pub max_results: usize,

    /// Maximum number of live prepared statements (0 = unlimited).
    pub max_statements: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            max_connections: 0,
            max_results: 0,
            max_statements: 0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of shards per registry.
    #[must_use]
    pub const fn shard_count(mut self, count: usize) -> Self {
        self.shard_count = count;
        self
    }

    /// Sets the live connection limit.
    #[must_use]
    pub const fn max_connections(mut self, limit: usize) -> Self {
        self.max_connections = limit;
        self
    }

    /// Sets the live result limit.
    #[must_use]
    pub const fn max_results(mut self, limit: usize) -> Self {
        self.max_results = limit;
        self
    }

    /// Sets the live prepared statement limit.
    #[must_use]
    pub const fn max_statements(mut self, limit: usize) -> Self {
        self.max_statements = limit;
        self
    }
}
