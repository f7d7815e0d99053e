//! Prepared statements and bound parameters.

use crate::error::{BridgeError, BridgeResult};
use crate::handle::Handle;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    /// SQL NULL.
    Null,
    /// A 64-bit integer.
    Int(i64),
    /// A UTF-8 string.
    Text(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Null => f.write_str("NULL"),
            Param::Int(v) => write!(f, "{v}"),
            Param::Text(v) => write!(f, "'{v}'"),
        }
    }
}

/// Highest placeholder index a statement accepts.
///
/// Matches SQLite's default host-parameter limit. Binding above it is
/// rejected before any storage is reserved.
pub const MAX_PARAMS: usize = 32_766;

/// A registered prepared statement.
///
/// Remembers the connection handle it was prepared on and the SQL text.
/// Bindings use 1-based placeholder indices; positions below the highest
/// bound index that were never bound are passed as NULL.
#[derive(Debug)]
pub struct PreparedStatement {
    connection: Handle,
    sql: String,
    params: Mutex<Vec<Param>>,
}

impl PreparedStatement {
    pub(crate) fn new(connection: Handle, sql: impl Into<String>) -> Self {
        Self {
            connection,
            sql: sql.into(),
            params: Mutex::new(Vec::new()),
        }
    }

    /// Returns the connection the statement belongs to.
    pub fn connection(&self) -> Handle {
        self.connection
    }

    /// Returns the SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Binds `value` to the 1-based placeholder `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `index < 1` or `index > MAX_PARAMS`.
    pub fn bind(&self, index: i64, value: Param) -> BridgeResult<()> {
        let slot = usize::try_from(index)
            .ok()
            .filter(|i| (1..=MAX_PARAMS).contains(i))
            .map(|i| i - 1)
            .ok_or_else(|| {
                BridgeError::invalid_argument(format!(
                    "parameter index must be in 1..={MAX_PARAMS}, got {index}"
                ))
            })?;

        let mut params = self.params.lock();
        if params.len() <= slot {
            params.resize(slot + 1, Param::Null);
        }
        params[slot] = value;
        Ok(())
    }

    /// Removes every binding.
    pub fn clear_bindings(&self) {
        self.params.lock().clear();
    }

    /// Returns a copy of the current bindings in placeholder order.
    pub fn params(&self) -> Vec<Param> {
        self.params.lock().clone()
    }
}
