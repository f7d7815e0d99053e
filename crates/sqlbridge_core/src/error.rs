//! Error types and the per-thread last-error channel.

use crate::handle::{HandleKind, RawHandle};
use std::cell::RefCell;
use thiserror::Error;

/// Result type for typed bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors reported by a driver adapter.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver could not open a connection.
    #[error("connect failed: {message}")]
    Connect {
        /// Description of the failure.
        message: String,
    },

    /// A statement failed to execute.
    #[error("execute failed: {message}")]
    Execute {
        /// Description of the failure.
        message: String,
    },

    /// The native connection was already released.
    #[error("native connection already closed")]
    Closed,

    /// The driver does not support the request.
    #[error("unsupported: {message}")]
    Unsupported {
        /// What was requested.
        message: String,
    },

    /// Error raised by SQLite.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DriverError {
    /// Creates a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates an execute error.
    pub fn execute(message: impl Into<String>) -> Self {
        Self::Execute {
            message: message.into(),
        }
    }

    /// Creates an unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

/// Errors that can occur in bridge operations.
///
/// These never cross the foreign boundary directly; the sentinel operations
/// turn them into `0`, `-1` or `""` and record the message as the thread's
/// last error.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The handle is not live in its registry.
    #[error("unknown {kind} handle {handle}")]
    UnknownHandle {
        /// Registry that was searched.
        kind: HandleKind,
        /// The raw handle value supplied by the caller.
        handle: RawHandle,
    },

    /// The driver adapter failed.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A row or column index is outside the result.
    #[error("index out of range: row {row}, column {column}")]
    OutOfRange {
        /// Requested row.
        row: i64,
        /// Requested column.
        column: i64,
    },

    /// A configured registry limit was reached.
    #[error("{kind} limit of {limit} reached")]
    LimitExceeded {
        /// Registry that is full.
        kind: HandleKind,
        /// The configured limit.
        limit: usize,
    },

    /// An argument was rejected before reaching the driver.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The connection was closed while the operation was in flight.
    #[error("connection {handle} was closed")]
    ConnectionClosed {
        /// The connection handle.
        handle: RawHandle,
    },
}

impl BridgeError {
    /// Creates an unknown-handle error.
    pub fn unknown(kind: HandleKind, handle: RawHandle) -> Self {
        Self::UnknownHandle { kind, handle }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true for unknown-handle errors.
    pub fn is_unknown_handle(&self) -> bool {
        matches!(self, Self::UnknownHandle { .. })
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Records the last error message for the current thread.
pub fn set_last_error(message: impl Into<String>) {
    let msg = message.into();
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(msg);
    });
}

/// Clears the current thread's last error.
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Returns the current thread's last error message, if any.
///
/// The message describes the most recent failure sentinel returned on this
/// thread and is cleared at the start of the next bridge operation.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = BridgeError::unknown(HandleKind::Connection, 999);
        assert_eq!(err.to_string(), "unknown connection handle 999");
        assert!(err.is_unknown_handle());

        let err: BridgeError = DriverError::connect("refused").into();
        assert_eq!(err.to_string(), "driver error: connect failed: refused");
        assert!(!err.is_unknown_handle());

        let err = BridgeError::LimitExceeded {
            kind: HandleKind::Result,
            limit: 4,
        };
        assert_eq!(err.to_string(), "result limit of 4 reached");
    }

    #[test]
    fn last_error_is_per_thread() {
        clear_last_error();
        assert!(last_error().is_none());

        set_last_error("boom");
        assert_eq!(last_error().as_deref(), Some("boom"));

        let other = std::thread::spawn(last_error).join().unwrap();
        assert!(other.is_none());

        clear_last_error();
        assert!(last_error().is_none());
    }
}
