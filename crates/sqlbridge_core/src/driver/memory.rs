//! In-memory driver for testing.

use crate::driver::{Driver, NativeConnection};
use crate::error::{DriverError, DriverResult};
use crate::resource::{Param, ResultSet};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A statement seen by a [`MemoryDriver`] connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStatement {
    /// Connection string of the connection that ran it.
    pub conn_string: String,
    /// SQL text.
    pub sql: String,
    /// Bound parameters.
    pub params: Vec<Param>,
}

#[derive(Debug, Default)]
struct MemoryState {
    results: RwLock<HashMap<String, ResultSet>>,
    affected: RwLock<HashMap<String, u64>>,
    refused: RwLock<HashSet<String>>,
    executed: Mutex<Vec<ExecutedStatement>>,
    opened: AtomicU64,
    closed: AtomicU64,
}

/// A scriptable in-process driver.
///
/// Statements are answered from canned responses keyed by their exact SQL
/// text; anything unscripted fails like a real driver would. Clones share
/// the same script and counters, so a test can keep one clone while the
/// bridge owns another.
///
/// # Example
///
/// ```rust
/// use sqlbridge_core::{Bridge, MemoryDriver, ResultSet};
///
/// let driver = MemoryDriver::new()
///     .with_result("SELECT 1", ResultSet::new(["one"], [["1"]]))
///     .with_affected("DELETE FROM t", 4);
/// let bridge = Bridge::new(driver.clone());
///
/// let conn = bridge.create_connection("memory://doc");
/// let res = bridge.execute_query(conn, "SELECT 1");
/// assert_eq!(bridge.get_value(res, 0, 0), "1");
/// assert_eq!(bridge.execute_non_query(conn, "DELETE FROM t"), 4);
/// assert_eq!(driver.opened(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    state: Arc<MemoryState>,
}

impl MemoryDriver {
    /// Creates a driver with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `sql` with `result`.
    #[must_use]
    pub fn with_result(self, sql: impl Into<String>, result: ResultSet) -> Self {
        self.add_result(sql, result);
        self
    }

    /// Answers `sql` as a non-query affecting `rows` rows.
    #[must_use]
    pub fn with_affected(self, sql: impl Into<String>, rows: u64) -> Self {
        self.add_affected(sql, rows);
        self
    }

    /// Refuses connections opened with `conn_string`.
    #[must_use]
    pub fn refusing(self, conn_string: impl Into<String>) -> Self {
        self.state.refused.write().insert(conn_string.into());
        self
    }

    /// Adds or replaces a canned result.
    pub fn add_result(&self, sql: impl Into<String>, result: ResultSet) {
        self.state.results.write().insert(sql.into(), result);
    }

    /// Adds or replaces a canned affected-row count.
    pub fn add_affected(&self, sql: impl Into<String>, rows: u64) {
        self.state.affected.write().insert(sql.into(), rows);
    }

    /// Returns the number of native connections opened.
    pub fn opened(&self) -> u64 {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Returns the number of native connections closed.
    pub fn closed(&self) -> u64 {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Returns every statement executed so far, in order.
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.state.executed.lock().clone()
    }
}

impl Driver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    fn open(&self, conn_string: &str) -> DriverResult<Box<dyn NativeConnection>> {
        if conn_string.is_empty() {
            return Err(DriverError::connect("empty connection string"));
        }
        if self.state.refused.read().contains(conn_string) {
            return Err(DriverError::connect(format!(
                "connection refused: {conn_string}"
            )));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            conn_string: conn_string.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryConnection {
    conn_string: String,
    state: Arc<MemoryState>,
}

impl MemoryConnection {
    fn log(&self, sql: &str, params: &[Param]) {
        self.state.executed.lock().push(ExecutedStatement {
            conn_string: self.conn_string.clone(),
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl NativeConnection for MemoryConnection {
    fn execute(&mut self, sql: &str, params: &[Param]) -> DriverResult<ResultSet> {
        self.log(sql, params);
        self.state
            .results
            .read()
            .get(sql)
            .cloned()
            .ok_or_else(|| DriverError::execute(format!("no canned result for `{sql}`")))
    }

    fn execute_non_query(&mut self, sql: &str, params: &[Param]) -> DriverResult<u64> {
        self.log(sql, params);
        self.state
            .affected
            .read()
            .get(sql)
            .copied()
            .ok_or_else(|| DriverError::execute(format!("no canned row count for `{sql}`")))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
