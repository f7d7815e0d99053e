//! Python bindings for SqlBridge.
//!
//! This crate provides Python bindings using PyO3.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use sqlbridge_core::{last_error, Bridge as CoreBridge, Config, Driver, MemoryDriver};
use std::sync::Arc;

/// Library version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn driver_by_name(name: &str) -> PyResult<Arc<dyn Driver>> {
    match name {
        "memory" => Ok(Arc::new(MemoryDriver::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(sqlbridge_core::SqliteDriver::new())),
        other => Err(PyValueError::new_err(format!("unknown driver: {other}"))),
    }
}

/// A handle-based bridge to database connections.
///
/// Every method mirrors the C ABI: handles are plain integers, failures
/// return `0`, `-1`, `""` or `False`, and `last_error()` explains them.
#[pyclass]
pub struct Bridge {
    inner: Arc<CoreBridge>,
}

#[pymethods]
impl Bridge {
    /// Creates a bridge.
    ///
    /// Args:
    ///     driver: `"sqlite"` or `"memory"`
    ///     shard_count: Registry shard count
    #[new]
    #[pyo3(signature = (driver="sqlite", shard_count=16))]
    fn new(driver: &str, shard_count: usize) -> PyResult<Self> {
        let config = Config::new().shard_count(shard_count);
        Ok(Self {
            inner: Arc::new(CoreBridge::with_shared_driver(config, driver_by_name(driver)?)),
        })
    }

    /// The driver name.
    #[getter]
    fn driver(&self) -> &str {
        self.inner.driver_name()
    }

    /// Opens a connection. Returns its handle, or 0 on failure.
    fn create_connection(&self, py: Python<'_>, conn_string: &str) -> i64 {
        py.allow_threads(|| self.inner.create_connection(conn_string))
    }

    /// Closes a connection. Unknown handles are ignored.
    fn close_connection(&self, py: Python<'_>, conn: i64) {
        py.allow_threads(|| self.inner.close_connection(conn));
    }

    /// Runs a query. Returns a result handle, or 0 on failure.
    fn execute_query(&self, py: Python<'_>, conn: i64, sql: &str) -> i64 {
        py.allow_threads(|| self.inner.execute_query(conn, sql))
    }

    /// Runs a statement. Returns the affected row count, or -1 on failure.
    fn execute_non_query(&self, py: Python<'_>, conn: i64, sql: &str) -> i64 {
        py.allow_threads(|| self.inner.execute_non_query(conn, sql))
    }

    /// Frees a result. Unknown handles are ignored.
    fn free_result(&self, result: i64) {
        self.inner.free_result(result);
    }

    /// Returns the row count, or 0 for an unknown handle.
    fn get_row_count(&self, result: i64) -> i64 {
        self.inner.get_row_count(result)
    }

    /// Returns the column count, or 0 for an unknown handle.
    fn get_column_count(&self, result: i64) -> i64 {
        self.inner.get_column_count(result)
    }

    /// Returns one cell, or "" when missing.
    fn get_value(&self, result: i64, row: i64, col: i64) -> String {
        self.inner.get_value(result, row, col)
    }

    /// Returns the rows as a list of dicts keyed by column name.
    ///
    /// Keys keep column order. Unknown handles give an empty list.
    fn result_to_list<'py>(&self, py: Python<'py>, result: i64) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .result_to_mapping(result)
            .into_iter()
            .map(|row| {
                let dict = PyDict::new(py);
                for (key, value) in row {
                    dict.set_item(key, value)?;
                }
                Ok(dict)
            })
            .collect()
    }

    /// Prepares a statement. Returns its handle, or 0 if the connection is
    /// unknown.
    fn prepare_statement(&self, conn: i64, sql: &str) -> i64 {
        self.inner.prepare_statement(conn, sql)
    }

    /// Binds an integer to a 1-based placeholder.
    fn bind_int(&self, stmt: i64, index: i64, value: i64) -> bool {
        self.inner.bind_int(stmt, index, value)
    }

    /// Binds a string to a 1-based placeholder.
    fn bind_string(&self, stmt: i64, index: i64, value: &str) -> bool {
        self.inner.bind_string(stmt, index, value)
    }

    /// Binds None to a 1-based placeholder.
    fn bind_null(&self, stmt: i64, index: i64) -> bool {
        self.inner.bind_null(stmt, index)
    }

    /// Drops every binding of a statement.
    fn clear_bindings(&self, stmt: i64) {
        self.inner.clear_bindings(stmt);
    }

    /// Runs a prepared query. Returns a result handle, or 0.
    fn execute_prepared(&self, py: Python<'_>, stmt: i64) -> i64 {
        py.allow_threads(|| self.inner.execute_prepared(stmt))
    }

    /// Runs a prepared statement. Returns the affected row count, or -1.
    fn execute_prepared_non_query(&self, py: Python<'_>, stmt: i64) -> i64 {
        py.allow_threads(|| self.inner.execute_prepared_non_query(stmt))
    }

    /// Closes a prepared statement.
    fn close_statement(&self, stmt: i64) {
        self.inner.close_statement(stmt);
    }

    /// Returns the message of the last failure on this thread, if any.
    fn last_error(&self) -> Option<String> {
        last_error()
    }

    /// Returns operation counters and live resource counts.
    fn stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let s = self.inner.stats();
        let dict = PyDict::new(py);
        dict.set_item("connections_opened", s.connections_opened)?;
        dict.set_item("connections_closed", s.connections_closed)?;
        dict.set_item("queries", s.queries)?;
        dict.set_item("non_queries", s.non_queries)?;
        dict.set_item("prepared_executions", s.prepared_executions)?;
        dict.set_item("results_freed", s.results_freed)?;
        dict.set_item("driver_errors", s.driver_errors)?;
        dict.set_item("unknown_handles", s.unknown_handles)?;
        dict.set_item("live_connections", s.live_connections)?;
        dict.set_item("live_results", s.live_results)?;
        dict.set_item("live_statements", s.live_statements)?;
        Ok(dict)
    }

    /// Closes every connection and frees every result and statement.
    ///
    /// Returns the number of connections closed.
    fn shutdown(&self, py: Python<'_>) -> usize {
        py.allow_threads(|| self.inner.shutdown())
    }

    /// Context manager entry.
    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    /// Context manager exit. Shuts the bridge down.
    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &self,
        py: Python<'_>,
        _exc_type: Option<PyObject>,
        _exc_val: Option<PyObject>,
        _exc_tb: Option<PyObject>,
    ) -> bool {
        self.shutdown(py);
        false
    }

    fn __repr__(&self) -> String {
        let s = self.inner.stats();
        format!(
            "Bridge(driver={}, connections={}, results={})",
            self.inner.driver_name(),
            s.live_connections,
            s.live_results
        )
    }
}

/// Python module initialization.
#[pymodule]
fn sqlbridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Bridge>()?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}

/// Returns the SqlBridge library version.
#[pyfunction]
fn version() -> &'static str {
    VERSION
}
