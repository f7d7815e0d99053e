//! # SqlBridge FFI
//!
//! Stable C ABI for SqlBridge bindings.
//!
//! This crate provides:
//! - A process-wide bridge started by `sqlbridge_init` and stopped by
//!   `sqlbridge_shutdown`
//! - Handle-based connection, result and prepared statement functions
//! - Rust-owned strings released with `sqlbridge_free_string`
//! - A per-thread last error readable with `sqlbridge_last_error`
//!
//! Every export catches panics and reports failure through its sentinel.

#![warn(missing_docs)]

mod buffer;
mod connection;
mod error;
mod result;
mod runtime;
mod statement;
mod types;

pub use buffer::{sqlbridge_free_string, SqlBridgeString};
pub use connection::{
    sqlbridge_close_connection, sqlbridge_create_connection, sqlbridge_execute_non_query,
    sqlbridge_execute_query,
};
pub use error::{sqlbridge_clear_error, sqlbridge_last_error, SqlBridgeStatus, StatusCode};
pub use result::{
    sqlbridge_free_result, sqlbridge_get_column_count, sqlbridge_get_row_count,
    sqlbridge_get_value, sqlbridge_result_to_json,
};
pub use runtime::{sqlbridge_init, sqlbridge_shutdown, sqlbridge_stats};
pub use statement::{
    sqlbridge_bind_int, sqlbridge_bind_null, sqlbridge_bind_string, sqlbridge_clear_bindings,
    sqlbridge_close_statement, sqlbridge_execute_prepared, sqlbridge_execute_prepared_non_query,
    sqlbridge_prepare_statement,
};
pub use types::{SqlBridgeConfig, SqlBridgeHandle, SqlBridgeStats};
