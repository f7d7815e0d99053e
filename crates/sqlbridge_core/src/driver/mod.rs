//! Driver adapter contract.
//!
//! The bridge never talks to a database itself. It asks a [`Driver`] to
//! open native connections and then runs statements through the returned
//! [`NativeConnection`]. Nothing driver-specific ever leaves this module's
//! traits.
//!
//! # Implementors
//!
//! - [`MemoryDriver`] - scriptable in-process driver for tests and demos
//! - `SqliteDriver` - SQLite through `rusqlite` (feature `sqlite`)

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::{ExecutedStatement, MemoryDriver};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

use crate::error::DriverResult;
use crate::resource::{Param, ResultSet};

/// Opens native connections.
///
/// Drivers must be `Send + Sync`; the bridge shares one driver across every
/// calling thread.
pub trait Driver: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Opens a connection described by `conn_string`.
    ///
    /// The connection string is opaque to the bridge and handed over as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn open(&self, conn_string: &str) -> DriverResult<Box<dyn NativeConnection>>;
}

/// One open native connection.
///
/// The bridge guarantees exclusive access while a method runs and calls
/// [`NativeConnection::close`] exactly once.
pub trait NativeConnection: Send {
    /// Runs a statement and materializes its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn execute(&mut self, sql: &str, params: &[Param]) -> DriverResult<ResultSet>;

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn execute_non_query(&mut self, sql: &str, params: &[Param]) -> DriverResult<u64>;

    /// Releases the native connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver reports a failure while closing. The
    /// connection is considered released either way.
    fn close(self: Box<Self>) -> DriverResult<()>;
}

impl<D: Driver + ?Sized> Driver for std::sync::Arc<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&self, conn_string: &str) -> DriverResult<Box<dyn NativeConnection>> {
        (**self).open(conn_string)
    }
}
