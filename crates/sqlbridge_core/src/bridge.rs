//! The bridge service and its typed operations.

use crate::config::Config;
use crate::driver::Driver;
use crate::error::{BridgeError, BridgeResult, DriverError};
use crate::handle::{Handle, HandleKind, RawHandle};
use crate::registry::Registry;
use crate::resource::{ConnectionResource, Param, PreparedStatement, ResultSet};
use crate::stats::{BridgeStats, StatsSnapshot};
use std::sync::Arc;

/// Owns every resource reachable through handles.
///
/// A bridge holds one driver and three independent registries
/// (connections, results, prepared statements). Each registry issues its own
/// handles, so a connection and a result may share a numeric value.
///
/// Operations come in two forms:
/// - `try_*` methods return [`BridgeResult`] and are meant for Rust callers
/// - sentinel methods (see the `boundary` module) return `0`, `-1` or `""`
///   on failure and never panic, for foreign callers
///
/// Dropping the bridge releases every native connection still registered.
pub struct Bridge {
    config: Config,
    driver: Arc<dyn Driver>,
    pub(crate) connections: Registry<ConnectionResource>,
    pub(crate) results: Registry<ResultSet>,
    pub(crate) statements: Registry<PreparedStatement>,
    pub(crate) stats: BridgeStats,
}

impl Bridge {
    /// Creates a bridge with the default configuration.
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self::with_config(Config::default(), driver)
    }

    /// Creates a bridge with the given configuration.
    pub fn with_config(config: Config, driver: impl Driver + 'static) -> Self {
        Self::with_shared_driver(config, Arc::new(driver))
    }

    /// Creates a bridge around a driver that is shared elsewhere.
    pub fn with_shared_driver(config: Config, driver: Arc<dyn Driver>) -> Self {
        Self {
            connections: Registry::with_shards(config.shard_count),
            results: Registry::with_shards(config.shard_count),
            statements: Registry::with_shards(config.shard_count),
            stats: BridgeStats::new(),
            driver,
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the driver name.
    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Returns the raw counters.
    pub fn raw_stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Returns a snapshot of the counters and live resource gauges.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::capture(
            &self.stats,
            [
                self.connections.len(),
                self.results.len(),
                self.statements.len(),
            ],
        )
    }

    fn check_limit<T>(registry: &Registry<T>, kind: HandleKind, limit: usize) -> BridgeResult<()> {
        if limit > 0 && registry.len() >= limit {
            return Err(BridgeError::LimitExceeded { kind, limit });
        }
        Ok(())
    }

    fn resolve<T>(&self, registry: &Registry<T>, kind: HandleKind, raw: RawHandle) -> BridgeResult<Arc<T>> {
        let found = Handle::from_raw(raw).and_then(|h| registry.get(h));
        found.ok_or_else(|| {
            self.stats.record_unknown_handle();
            BridgeError::unknown(kind, raw)
        })
    }

    fn driver_failure(&self, err: DriverError) -> BridgeError {
        self.stats.record_driver_error();
        BridgeError::Driver(err)
    }

    // === Connections ===

    /// Opens a connection through the driver and registers it.
    pub fn try_create_connection(&self, conn_string: &str) -> BridgeResult<Handle> {
        Self::check_limit(
            &self.connections,
            HandleKind::Connection,
            self.config.max_connections,
        )?;
        let native = self
            .driver
            .open(conn_string)
            .map_err(|e| self.driver_failure(e))?;
        let handle = self
            .connections
            .insert(ConnectionResource::new(conn_string, native));
        self.stats.record_connection_opened();
        Ok(handle)
    }

    /// Looks up a live connection.
    pub fn try_connection(&self, conn: RawHandle) -> BridgeResult<Arc<ConnectionResource>> {
        self.resolve(&self.connections, HandleKind::Connection, conn)
    }

    /// Unregisters a connection and releases its native side.
    ///
    /// The handle is dead once this returns, even if the driver reports a
    /// failure while closing.
    pub fn try_close_connection(&self, conn: RawHandle) -> BridgeResult<()> {
        let resource = Handle::from_raw(conn)
            .and_then(|h| self.connections.remove(h))
            .ok_or_else(|| BridgeError::unknown(HandleKind::Connection, conn))?;
        self.stats.record_connection_closed();
        resource.release().map_err(|e| self.driver_failure(e))
    }

    // === Queries ===

    /// Runs a query and registers its result.
    pub fn try_execute_query(&self, conn: RawHandle, sql: &str) -> BridgeResult<Handle> {
        self.run_query(conn, sql, &[])
    }

    /// Runs a statement and returns the affected row count.
    pub fn try_execute_non_query(&self, conn: RawHandle, sql: &str) -> BridgeResult<u64> {
        self.run_non_query(conn, sql, &[])
    }

    fn run_query(&self, conn: RawHandle, sql: &str, params: &[Param]) -> BridgeResult<Handle> {
        let connection = self.try_connection(conn)?;
        Self::check_limit(&self.results, HandleKind::Result, self.config.max_results)?;
        let result = connection
            .with_native(|native| native.execute(sql, params))
            .map_err(|e| self.closed_or_driver(conn, e))?;
        let handle = self.results.insert(result);
        self.stats.record_query();
        Ok(handle)
    }

    fn run_non_query(&self, conn: RawHandle, sql: &str, params: &[Param]) -> BridgeResult<u64> {
        let connection = self.try_connection(conn)?;
        let affected = connection
            .with_native(|native| native.execute_non_query(sql, params))
            .map_err(|e| self.closed_or_driver(conn, e))?;
        self.stats.record_non_query();
        Ok(affected)
    }

    fn closed_or_driver(&self, conn: RawHandle, err: DriverError) -> BridgeError {
        match err {
            DriverError::Closed => BridgeError::ConnectionClosed { handle: conn },
            other => self.driver_failure(other),
        }
    }

    // === Results ===

    /// Looks up a live result.
    pub fn try_result(&self, result: RawHandle) -> BridgeResult<Arc<ResultSet>> {
        self.resolve(&self.results, HandleKind::Result, result)
    }

    /// Returns one cell of a result.
    ///
    /// Unlike the sentinel accessor this tells a missing cell apart from an
    /// empty one.
    pub fn try_value(&self, result: RawHandle, row: i64, col: i64) -> BridgeResult<String> {
        let rs = self.try_result(result)?;
        let cell = match (usize::try_from(row), usize::try_from(col)) {
            (Ok(r), Ok(c)) => rs.cell(r, c),
            _ => None,
        };
        cell.map(str::to_string)
            .ok_or(BridgeError::OutOfRange { row, column: col })
    }

    /// Unregisters a result.
    pub fn try_free_result(&self, result: RawHandle) -> BridgeResult<()> {
        Handle::from_raw(result)
            .and_then(|h| self.results.remove(h))
            .ok_or_else(|| BridgeError::unknown(HandleKind::Result, result))?;
        self.stats.record_result_freed();
        Ok(())
    }

    // === Prepared statements ===

    /// Registers a prepared statement on a live connection.
    ///
    /// The driver is not contacted until the statement runs.
    pub fn try_prepare(&self, conn: RawHandle, sql: &str) -> BridgeResult<Handle> {
        let connection = Handle::from_raw(conn)
            .filter(|h| self.connections.contains(*h))
            .ok_or_else(|| {
                self.stats.record_unknown_handle();
                BridgeError::unknown(HandleKind::Connection, conn)
            })?;
        Self::check_limit(
            &self.statements,
            HandleKind::Statement,
            self.config.max_statements,
        )?;
        Ok(self.statements.insert(PreparedStatement::new(connection, sql)))
    }

    /// Looks up a live prepared statement.
    pub fn try_statement(&self, stmt: RawHandle) -> BridgeResult<Arc<PreparedStatement>> {
        self.resolve(&self.statements, HandleKind::Statement, stmt)
    }

    /// Binds a parameter to a prepared statement (1-based index).
    pub fn try_bind(&self, stmt: RawHandle, index: i64, value: Param) -> BridgeResult<()> {
        self.try_statement(stmt)?.bind(index, value)
    }

    /// Removes all bindings from a prepared statement.
    pub fn try_clear_bindings(&self, stmt: RawHandle) -> BridgeResult<()> {
        self.try_statement(stmt)?.clear_bindings();
        Ok(())
    }

    /// Runs a prepared statement and registers its result.
    pub fn try_execute_prepared(&self, stmt: RawHandle) -> BridgeResult<Handle> {
        let statement = self.try_statement(stmt)?;
        let handle = self.run_query(
            statement.connection().as_raw(),
            statement.sql(),
            &statement.params(),
        )?;
        self.stats.record_prepared_execution();
        Ok(handle)
    }

    /// Runs a prepared statement and returns the affected row count.
    pub fn try_execute_prepared_non_query(&self, stmt: RawHandle) -> BridgeResult<u64> {
        let statement = self.try_statement(stmt)?;
        let affected = self.run_non_query(
            statement.connection().as_raw(),
            statement.sql(),
            &statement.params(),
        )?;
        self.stats.record_prepared_execution();
        Ok(affected)
    }

    /// Unregisters a prepared statement.
    pub fn try_close_statement(&self, stmt: RawHandle) -> BridgeResult<()> {
        Handle::from_raw(stmt)
            .and_then(|h| self.statements.remove(h))
            .map(|_| ())
            .ok_or_else(|| BridgeError::unknown(HandleKind::Statement, stmt))
    }

    // === Lifecycle ===

    /// Releases every registered resource.
    ///
    /// All handles issued so far become dead; handles issued afterwards
    /// continue the sequence and never repeat an earlier value. Returns the
    /// number of connections that were closed.
    pub fn shutdown(&self) -> usize {
        let statements = self.statements.drain().len();
        let results = self.results.drain().len();
        let connections = self.connections.drain();
        let closed = connections.len();

        for (handle, conn) in connections {
            self.stats.record_connection_closed();
            if let Err(e) = conn.release() {
                self.stats.record_driver_error();
                tracing::warn!(%handle, error = %e, "connection failed to close during shutdown");
            }
        }
        for _ in 0..results {
            self.stats.record_result_freed();
        }

        tracing::info!(
            driver = self.driver.name(),
            connections = closed,
            results,
            statements,
            "bridge shut down"
        );
        closed
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if !self.connections.is_empty() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("driver", &self.driver.name())
            .field("config", &self.config)
            .field("connections", &self.connections)
            .field("results", &self.results)
            .field("statements", &self.statements)
            .finish()
    }
}
