//! # SqlBridge Core
//!
//! Handle tables that let foreign callers use database connections and
//! query results without ever holding a native pointer.
//!
//! This crate provides:
//! - A monotonic, never-reused handle allocator
//! - Sharded, thread-safe resource registries
//! - Connection, result and prepared-statement resources
//! - The driver adapter contract plus in-memory and SQLite drivers
//! - The [`Bridge`] service with typed (`try_*`) and sentinel-coded operations
//!
//! ## Example
//!
//! ```rust
//! use sqlbridge_core::{Bridge, MemoryDriver, ResultSet};
//!
//! let driver = MemoryDriver::new().with_result(
//!     "SELECT id, name FROM users",
//!     ResultSet::new(["id", "name"], [["1", "alice"], ["2", "bob"]]),
//! );
//! let bridge = Bridge::new(driver);
//!
//! let conn = bridge.create_connection("memory://example");
//! let result = bridge.execute_query(conn, "SELECT id, name FROM users");
//! assert_eq!(bridge.get_row_count(result), 2);
//! assert_eq!(bridge.get_value(result, 1, 1), "bob");
//!
//! bridge.free_result(result);
//! bridge.close_connection(conn);
//! assert_eq!(bridge.get_row_count(result), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod boundary;
mod bridge;
mod config;
pub mod driver;
mod error;
mod handle;
mod registry;
mod resource;
mod stats;

pub use boundary::INVALID_COUNT;
pub use bridge::Bridge;
pub use config::Config;
#[cfg(feature = "sqlite")]
pub use driver::SqliteDriver;
pub use driver::{Driver, ExecutedStatement, MemoryDriver, NativeConnection};
pub use error::{
    clear_last_error, last_error, set_last_error, BridgeError, BridgeResult, DriverError,
    DriverResult,
};
pub use handle::{Handle, HandleAllocator, HandleKind, RawHandle, INVALID_HANDLE};
pub use registry::{Registry, DEFAULT_SHARD_COUNT};
pub use resource::{
    ConnectionResource, Param, PreparedStatement, ResultSet, RowMap, MAX_PARAMS,
};
pub use stats::{BridgeStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
