//! Prepared statement FFI functions.
//!
//! Placeholders are 1-based. Bind functions return `1` on success and `0`
//! when the statement is unknown or the index is below 1.

use crate::buffer::read_str;
use crate::runtime::{bad_string, with_bridge};
use crate::types::SqlBridgeHandle;
use sqlbridge_core::{INVALID_COUNT, INVALID_HANDLE};
use std::ffi::c_char;

fn flag(ok: bool) -> i32 {
    i32::from(ok)
}

/// Prepares a statement on a connection.
///
/// Returns a statement handle, or `0` if the connection is unknown.
///
/// # Safety
///
/// `sql` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_prepare_statement(
    conn: SqlBridgeHandle,
    sql: *const c_char,
) -> SqlBridgeHandle {
    const OP: &str = "sqlbridge_prepare_statement";
    with_bridge(OP, || INVALID_HANDLE, |bridge| match read_str(sql) {
        Some(sql) => bridge.prepare_statement(conn, sql),
        None => bad_string(OP, "sql", INVALID_HANDLE),
    })
}

/// Binds an integer.
#[no_mangle]
pub extern "C" fn sqlbridge_bind_int(stmt: SqlBridgeHandle, index: i64, value: i64) -> i32 {
    with_bridge("sqlbridge_bind_int", || 0, |bridge| {
        flag(bridge.bind_int(stmt, index, value))
    })
}

/// Binds a string.
///
/// # Safety
///
/// `value` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_bind_string(
    stmt: SqlBridgeHandle,
    index: i64,
    value: *const c_char,
) -> i32 {
    const OP: &str = "sqlbridge_bind_string";
    with_bridge(OP, || 0, |bridge| match read_str(value) {
        Some(value) => flag(bridge.bind_string(stmt, index, value)),
        None => bad_string(OP, "value", 0),
    })
}

/// Binds NULL.
#[no_mangle]
pub extern "C" fn sqlbridge_bind_null(stmt: SqlBridgeHandle, index: i64) -> i32 {
    with_bridge("sqlbridge_bind_null", || 0, |bridge| {
        flag(bridge.bind_null(stmt, index))
    })
}

/// Drops every binding. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn sqlbridge_clear_bindings(stmt: SqlBridgeHandle) {
    with_bridge("sqlbridge_clear_bindings", || (), |bridge| {
        bridge.clear_bindings(stmt);
    });
}

/// Runs a prepared query. Returns a result handle, or `0` on failure.
#[no_mangle]
pub extern "C" fn sqlbridge_execute_prepared(stmt: SqlBridgeHandle) -> SqlBridgeHandle {
    with_bridge("sqlbridge_execute_prepared", || INVALID_HANDLE, |bridge| {
        bridge.execute_prepared(stmt)
    })
}

/// Runs a prepared statement. Returns the affected row count, or `-1`.
#[no_mangle]
pub extern "C" fn sqlbridge_execute_prepared_non_query(stmt: SqlBridgeHandle) -> i64 {
    with_bridge(
        "sqlbridge_execute_prepared_non_query",
        || INVALID_COUNT,
        |bridge| bridge.execute_prepared_non_query(stmt),
    )
}

/// Closes a prepared statement. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn sqlbridge_close_statement(stmt: SqlBridgeHandle) {
    with_bridge("sqlbridge_close_statement", || (), |bridge| {
        bridge.close_statement(stmt);
    });
}
