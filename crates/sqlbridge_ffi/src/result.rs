//! Result accessor FFI functions.

use crate::buffer::SqlBridgeString;
use crate::runtime::with_bridge;
use crate::types::SqlBridgeHandle;
use sqlbridge_core::set_last_error;

/// Frees a result. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn sqlbridge_free_result(result: SqlBridgeHandle) {
    with_bridge("sqlbridge_free_result", || (), |bridge| {
        bridge.free_result(result);
    });
}

/// Returns the number of rows, or `0` for an unknown handle.
#[no_mangle]
pub extern "C" fn sqlbridge_get_row_count(result: SqlBridgeHandle) -> i64 {
    with_bridge("sqlbridge_get_row_count", || 0, |bridge| {
        bridge.get_row_count(result)
    })
}

/// Returns the number of columns, or `0` for an unknown handle.
#[no_mangle]
pub extern "C" fn sqlbridge_get_column_count(result: SqlBridgeHandle) -> i64 {
    with_bridge("sqlbridge_get_column_count", || 0, |bridge| {
        bridge.get_column_count(result)
    })
}

/// Returns one cell as a string.
///
/// Returns an empty string when the handle is unknown or either index is
/// out of range. The caller must free the returned string with
/// `sqlbridge_free_string`.
#[no_mangle]
pub extern "C" fn sqlbridge_get_value(result: SqlBridgeHandle, row: i64, col: i64) -> SqlBridgeString {
    with_bridge("sqlbridge_get_value", SqlBridgeString::empty, |bridge| {
        SqlBridgeString::from_str(&bridge.get_value(result, row, col))
    })
}

/// Returns the result as a JSON array of objects, one per row.
///
/// Object keys follow column order. Returns `[]` for an unknown handle.
/// The caller must free the returned string with `sqlbridge_free_string`.
#[no_mangle]
pub extern "C" fn sqlbridge_result_to_json(result: SqlBridgeHandle) -> SqlBridgeString {
    const OP: &str = "sqlbridge_result_to_json";
    let empty = || SqlBridgeString::from_str("[]");
    with_bridge(OP, empty, |bridge| {
        let rows = bridge.result_to_mapping(result);
        match serde_json::to_string(&rows) {
            Ok(json) => SqlBridgeString::from_str(&json),
            Err(e) => {
                set_last_error(format!("{OP}: {e}"));
                empty()
            }
        }
    })
}
