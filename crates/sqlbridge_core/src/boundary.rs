//! Sentinel-coded operations for foreign callers.
//!
//! Every method here is total: it never panics on bad input and never
//! returns an error value. Failures are reported through the documented
//! sentinels and the thread's last-error message.
//!
//! | Operation | Success | Failure |
//! |---|---|---|
//! | `create_connection` | handle > 0 | `0` |
//! | `execute_query` | handle > 0 | `0` |
//! | `execute_non_query` | rows >= 0 | `-1` |
//! | `get_row_count` / `get_column_count` | count >= 0 | `0` |
//! | `get_value` | cell | `""` |
//! | `prepare_statement` / `execute_prepared` | handle > 0 | `0` |
//! | `bind_*` | `true` | `false` |
//! | `execute_prepared_non_query` | rows >= 0 | `-1` |
//!
//! `close_connection`, `free_result` and `close_statement` are idempotent
//! and report nothing.

use crate::bridge::Bridge;
use crate::error::{clear_last_error, set_last_error, BridgeResult};
use crate::handle::{Handle, RawHandle, INVALID_HANDLE};
use crate::resource::{Param, RowMap};

/// Failure sentinel for affected-row counts.
pub const INVALID_COUNT: i64 = -1;

fn sentinel<T>(op: &'static str, result: BridgeResult<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(op, error = %e, "returning failure sentinel");
            set_last_error(e.to_string());
            fallback
        }
    }
}

fn handle_or_invalid(op: &'static str, result: BridgeResult<Handle>) -> RawHandle {
    sentinel(op, result.map(Handle::as_raw), INVALID_HANDLE)
}

fn count_or_invalid(op: &'static str, result: BridgeResult<u64>) -> i64 {
    let result = result.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
    sentinel(op, result, INVALID_COUNT)
}

impl Bridge {
    /// Opens a connection. Returns its handle, or `0` on failure.
    pub fn create_connection(&self, conn_string: &str) -> RawHandle {
        clear_last_error();
        handle_or_invalid("create_connection", self.try_create_connection(conn_string))
    }

    /// Closes a connection. Unknown handles are ignored.
    pub fn close_connection(&self, conn: RawHandle) {
        clear_last_error();
        match self.try_close_connection(conn) {
            Ok(()) => {}
            Err(e) if e.is_unknown_handle() => {
                tracing::debug!(conn, "close of unknown connection ignored");
            }
            Err(e) => {
                // The handle is already dead; only the native close failed.
                tracing::warn!(conn, error = %e, "connection closed with driver error");
            }
        }
    }

    /// Runs a query. Returns a result handle, or `0` on failure.
    ///
    /// An unknown connection fails without reaching the driver.
    pub fn execute_query(&self, conn: RawHandle, sql: &str) -> RawHandle {
        clear_last_error();
        handle_or_invalid("execute_query", self.try_execute_query(conn, sql))
    }

    /// Runs a statement. Returns the affected row count, or `-1` on failure.
    pub fn execute_non_query(&self, conn: RawHandle, sql: &str) -> i64 {
        clear_last_error();
        count_or_invalid("execute_non_query", self.try_execute_non_query(conn, sql))
    }

    /// Frees a result. Unknown handles are ignored.
    pub fn free_result(&self, result: RawHandle) {
        clear_last_error();
        if self.try_free_result(result).is_err() {
            tracing::debug!(result, "free of unknown result ignored");
        }
    }

    /// Returns the row count, or `0` for an unknown handle.
    pub fn get_row_count(&self, result: RawHandle) -> i64 {
        clear_last_error();
        let count = self.try_result(result).map(|rs| rs.row_count() as i64);
        sentinel("get_row_count", count, 0)
    }

    /// Returns the column count, or `0` for an unknown handle.
    pub fn get_column_count(&self, result: RawHandle) -> i64 {
        clear_last_error();
        let count = self.try_result(result).map(|rs| rs.column_count() as i64);
        sentinel("get_column_count", count, 0)
    }

    /// Returns one cell, or `""` when the handle is unknown, either index is
    /// out of range, or the row is too short.
    ///
    /// A missing cell cannot be told apart from an empty one here; use
    /// [`Bridge::try_value`] when that matters.
    pub fn get_value(&self, result: RawHandle, row: i64, col: i64) -> String {
        clear_last_error();
        sentinel("get_value", self.try_value(result, row, col), String::new())
    }

    /// Converts a result into one ordered mapping per row.
    ///
    /// Returns an empty sequence for an unknown handle.
    pub fn result_to_mapping(&self, result: RawHandle) -> Vec<RowMap> {
        clear_last_error();
        let rows = self.try_result(result).map(|rs| rs.to_mappings());
        sentinel("result_to_mapping", rows, Vec::new())
    }

    /// Prepares a statement. Returns its handle, or `0` if the connection is
    /// unknown.
    pub fn prepare_statement(&self, conn: RawHandle, sql: &str) -> RawHandle {
        clear_last_error();
        handle_or_invalid("prepare_statement", self.try_prepare(conn, sql))
    }

    /// Binds an integer to a 1-based placeholder.
    pub fn bind_int(&self, stmt: RawHandle, index: i64, value: i64) -> bool {
        self.bind("bind_int", stmt, index, Param::Int(value))
    }

    /// Binds a string to a 1-based placeholder.
    pub fn bind_string(&self, stmt: RawHandle, index: i64, value: &str) -> bool {
        self.bind("bind_string", stmt, index, Param::Text(value.to_string()))
    }

    /// Binds NULL to a 1-based placeholder.
    pub fn bind_null(&self, stmt: RawHandle, index: i64) -> bool {
        self.bind("bind_null", stmt, index, Param::Null)
    }

    fn bind(&self, op: &'static str, stmt: RawHandle, index: i64, value: Param) -> bool {
        clear_last_error();
        sentinel(op, self.try_bind(stmt, index, value).map(|()| true), false)
    }

    /// Drops every binding of a statement. Unknown handles are ignored.
    pub fn clear_bindings(&self, stmt: RawHandle) {
        clear_last_error();
        if self.try_clear_bindings(stmt).is_err() {
            tracing::debug!(stmt, "clear of unknown statement ignored");
        }
    }

    /// Runs a prepared statement. Returns a result handle, or `0`.
    pub fn execute_prepared(&self, stmt: RawHandle) -> RawHandle {
        clear_last_error();
        handle_or_invalid("execute_prepared", self.try_execute_prepared(stmt))
    }

    /// Runs a prepared statement. Returns the affected row count, or `-1`.
    pub fn execute_prepared_non_query(&self, stmt: RawHandle) -> i64 {
        clear_last_error();
        count_or_invalid(
            "execute_prepared_non_query",
            self.try_execute_prepared_non_query(stmt),
        )
    }

    /// Closes a prepared statement. Unknown handles are ignored.
    pub fn close_statement(&self, stmt: RawHandle) {
        clear_last_error();
        if self.try_close_statement(stmt).is_err() {
            tracing::debug!(stmt, "close of unknown statement ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;
    use crate::error::last_error;
    use crate::resource::ResultSet;

    fn bridge() -> Bridge {
        Bridge::new(
            MemoryDriver::new()
                .with_result("SELECT 1", ResultSet::new(["one"], [["1"]]))
                .with_affected("DELETE FROM t", 0),
        )
    }

    #[test]
    fn failures_set_last_error() {
        let bridge = bridge();
        assert_eq!(bridge.create_connection(""), INVALID_HANDLE);
        assert!(last_error().unwrap().contains("empty connection string"));

        let conn = bridge.create_connection("memory://a");
        assert!(conn > 0);
        assert!(last_error().is_none());

        assert_eq!(bridge.execute_query(conn, "SELECT 2"), INVALID_HANDLE);
        assert!(last_error().unwrap().contains("no canned result"));
    }

    #[test]
    fn zero_affected_is_not_failure() {
        let bridge = bridge();
        let conn = bridge.create_connection("memory://a");
        assert_eq!(bridge.execute_non_query(conn, "DELETE FROM t"), 0);
        assert_eq!(bridge.execute_non_query(conn, "DROP TABLE t"), INVALID_COUNT);
        assert_eq!(bridge.execute_non_query(0, "DELETE FROM t"), INVALID_COUNT);
    }

    #[test]
    fn idempotent_close_leaves_no_error() {
        let bridge = bridge();
        let conn = bridge.create_connection("memory://a");
        bridge.close_connection(conn);
        bridge.close_connection(conn);
        assert!(last_error().is_none());

        bridge.free_result(12345);
        bridge.close_statement(-3);
        bridge.clear_bindings(7);
        assert!(last_error().is_none());
    }

    #[test]
    fn negative_indices_are_out_of_range() {
        let bridge = bridge();
        let conn = bridge.create_connection("memory://a");
        let res = bridge.execute_query(conn, "SELECT 1");

        assert_eq!(bridge.get_value(res, -1, 0), "");
        assert_eq!(bridge.get_value(res, 0, -1), "");
        assert_eq!(bridge.get_value(res, i64::MAX, i64::MAX), "");
        assert_eq!(bridge.get_value(res, 0, 0), "1");
    }

    #[test]
    fn bind_sentinels() {
        let bridge = bridge();
        let conn = bridge.create_connection("memory://a");
        let stmt = bridge.prepare_statement(conn, "SELECT 1");
        assert!(stmt > 0);

        assert!(bridge.bind_int(stmt, 1, 10));
        assert!(bridge.bind_string(stmt, 2, "x"));
        assert!(bridge.bind_null(stmt, 3));
        assert!(!bridge.bind_int(stmt, 0, 10));
        assert!(!bridge.bind_int(stmt + 100, 1, 10));
        assert_eq!(bridge.prepare_statement(conn + 100, "SELECT 1"), INVALID_HANDLE);
    }

    #[test]
    fn huge_bind_index_is_rejected_not_allocated() {
        let bridge = bridge();
        let conn = bridge.create_connection("memory://a");
        let stmt = bridge.prepare_statement(conn, "SELECT 1");

        assert!(!bridge.bind_int(stmt, i64::MAX, 1));
        assert!(last_error().unwrap().contains("parameter index"));
        assert!(!bridge.bind_string(stmt, 1 << 33, "x"));
        assert!(!bridge.bind_null(stmt, 40_000));
        assert!(bridge.try_statement(stmt).unwrap().params().is_empty());

        assert!(bridge.bind_int(stmt, 2, 1));
        assert_eq!(bridge.try_statement(stmt).unwrap().params().len(), 2);
    }
}
