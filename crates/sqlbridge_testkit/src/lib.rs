//! # SqlBridge Testkit
//!
//! Test utilities for SqlBridge.
//!
//! This crate provides:
//! - Test fixtures with scripted and SQLite-backed bridges
//! - Property-based test generators using proptest
//! - Stress testing utilities for concurrent handle traffic
//!
//! ## Usage
//!
//! ```rust
//! use sqlbridge_testkit::prelude::*;
//!
//! with_test_bridge(|bridge| {
//!     let conn = bridge.create_connection("memory://doc");
//!     let res = bridge.execute_query(conn, USERS_QUERY);
//!     assert_eq!(bridge.get_row_count(res), 3);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
