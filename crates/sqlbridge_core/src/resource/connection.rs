//! Connection resources.

use crate::driver::NativeConnection;
use crate::error::{DriverError, DriverResult};
use parking_lot::Mutex;
use std::fmt;

/// A registered connection.
///
/// Owns exactly one native connection. The native side sits behind its own
/// lock so that a statement running on it and a concurrent close never
/// overlap; once released it cannot be used again.
pub struct ConnectionResource {
    conn_string: String,
    native: Mutex<Option<Box<dyn NativeConnection>>>,
}

impl ConnectionResource {
    pub(crate) fn new(conn_string: impl Into<String>, native: Box<dyn NativeConnection>) -> Self {
        Self {
            conn_string: conn_string.into(),
            native: Mutex::new(Some(native)),
        }
    }

    /// Returns the connection string the connection was opened with.
    pub fn conn_string(&self) -> &str {
        &self.conn_string
    }

    /// Returns true until the native connection has been released.
    pub fn is_open(&self) -> bool {
        self.native.lock().is_some()
    }

    /// Runs `f` with exclusive access to the native connection.
    pub(crate) fn with_native<R>(
        &self,
        f: impl FnOnce(&mut dyn NativeConnection) -> DriverResult<R>,
    ) -> DriverResult<R> {
        let mut native = self.native.lock();
        match native.as_mut() {
            Some(conn) => f(conn.as_mut()),
            None => Err(DriverError::Closed),
        }
    }

    /// Releases the native connection. Later calls are no-ops.
    pub(crate) fn release(&self) -> DriverResult<()> {
        let native = self.native.lock().take();
        match native {
            Some(conn) => conn.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ConnectionResource {
    fn drop(&mut self) {
        if let Some(conn) = self.native.get_mut().take() {
            if let Err(e) = conn.close() {
                tracing::warn!(error = %e, "native connection failed to close on drop");
            }
        }
    }
}

impl fmt::Debug for ConnectionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionResource")
            .field("conn_string", &self.conn_string)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Driver, MemoryDriver};

    #[test]
    fn release_is_exactly_once() {
        let driver = MemoryDriver::new();
        let conn = ConnectionResource::new("memory://a", driver.open("memory://a").unwrap());

        assert!(conn.is_open());
        conn.release().unwrap();
        assert!(!conn.is_open());
        conn.release().unwrap();
        drop(conn);

        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.closed(), 1);
    }

    #[test]
    fn released_connection_rejects_statements() {
        let driver = MemoryDriver::new().with_affected("DELETE FROM t", 3);
        let conn = ConnectionResource::new("memory://a", driver.open("memory://a").unwrap());

        let n = conn.with_native(|c| c.execute_non_query("DELETE FROM t", &[])).unwrap();
        assert_eq!(n, 3);

        conn.release().unwrap();
        let err = conn
            .with_native(|c| c.execute_non_query("DELETE FROM t", &[]))
            .unwrap_err();
        assert!(matches!(err, DriverError::Closed));
    }

    #[test]
    fn drop_releases_native() {
        let driver = MemoryDriver::new();
        {
            let _conn = ConnectionResource::new("memory://b", driver.open("memory://b").unwrap());
        }
        assert_eq!(driver.closed(), 1);
    }
}
