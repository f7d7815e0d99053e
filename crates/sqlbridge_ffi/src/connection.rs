//! Connection and execution FFI functions.

use crate::buffer::read_str;
use crate::runtime::{bad_string, with_bridge};
use crate::types::SqlBridgeHandle;
use sqlbridge_core::{INVALID_COUNT, INVALID_HANDLE};
use std::ffi::c_char;

/// Opens a connection.
///
/// Returns the connection handle, or `0` on failure.
///
/// # Safety
///
/// `conn_string` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_create_connection(conn_string: *const c_char) -> SqlBridgeHandle {
    const OP: &str = "sqlbridge_create_connection";
    with_bridge(OP, || INVALID_HANDLE, |bridge| match read_str(conn_string) {
        Some(conn_string) => bridge.create_connection(conn_string),
        None => bad_string(OP, "connection string", INVALID_HANDLE),
    })
}

/// Closes a connection. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn sqlbridge_close_connection(conn: SqlBridgeHandle) {
    with_bridge("sqlbridge_close_connection", || (), |bridge| {
        bridge.close_connection(conn);
    });
}

/// Runs a query.
///
/// Returns a result handle, or `0` on failure. Free the result with
/// `sqlbridge_free_result`.
///
/// # Safety
///
/// `sql` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_execute_query(
    conn: SqlBridgeHandle,
    sql: *const c_char,
) -> SqlBridgeHandle {
    const OP: &str = "sqlbridge_execute_query";
    with_bridge(OP, || INVALID_HANDLE, |bridge| match read_str(sql) {
        Some(sql) => bridge.execute_query(conn, sql),
        None => bad_string(OP, "sql", INVALID_HANDLE),
    })
}

/// Runs a statement that returns no rows.
///
/// Returns the affected row count, or `-1` on failure.
///
/// # Safety
///
/// `sql` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_execute_non_query(conn: SqlBridgeHandle, sql: *const c_char) -> i64 {
    const OP: &str = "sqlbridge_execute_non_query";
    with_bridge(OP, || INVALID_COUNT, |bridge| match read_str(sql) {
        Some(sql) => bridge.execute_non_query(conn, sql),
        None => bad_string(OP, "sql", INVALID_COUNT),
    })
}
