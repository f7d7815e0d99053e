//! Resources owned by the registries.
//!
//! - [`ConnectionResource`] wraps one native connection
//! - [`ResultSet`] is a materialized tabular result
//! - [`PreparedStatement`] holds SQL text and bound parameters

mod connection;
mod result;
mod statement;

pub use connection::ConnectionResource;
pub use result::{ResultSet, RowMap};
pub use statement::{Param, PreparedStatement, MAX_PARAMS};
