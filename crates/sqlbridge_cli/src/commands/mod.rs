//! CLI command implementations.

pub mod exec;
pub mod query;

use sqlbridge_core::{last_error, Bridge, RawHandle, SqliteDriver, INVALID_HANDLE};

/// Opens a SQLite-backed bridge and one connection on it.
pub fn connect(conn: &str) -> Result<(Bridge, RawHandle), Box<dyn std::error::Error>> {
    let bridge = Bridge::new(SqliteDriver::new());
    let handle = bridge.create_connection(conn);
    if handle == INVALID_HANDLE {
        return Err(failure("could not connect"));
    }
    tracing::debug!(conn, handle, "connected");
    Ok((bridge, handle))
}

/// Builds an error from the thread's last bridge error.
pub fn failure(context: &str) -> Box<dyn std::error::Error> {
    match last_error() {
        Some(message) => format!("{context}: {message}").into(),
        None => context.into(),
    }
}
