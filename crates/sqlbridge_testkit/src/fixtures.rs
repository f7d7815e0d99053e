//! Test fixtures and bridge helpers.
//!
//! Provides bridges preloaded with a small `users` table, either scripted
//! through [`MemoryDriver`] or backed by a temporary SQLite file.

use sqlbridge_core::{Bridge, Config, MemoryDriver, ResultSet, SqliteDriver};
use std::path::PathBuf;
use tempfile::TempDir;

/// Query answered by the users fixture.
pub const USERS_QUERY: &str = "SELECT id, username, email FROM users";

/// Statement answered by the users fixture with three affected rows.
pub const USERS_DELETE: &str = "DELETE FROM users";

/// Parameterized lookup answered by the users fixture with one row.
pub const USER_BY_ID: &str = "SELECT id, username, email FROM users WHERE id = ?";

/// Rows of the users fixture.
pub const USERS: [[&str; 3]; 3] = [
    ["1", "alice", "alice@example.com"],
    ["2", "bob", "bob@example.com"],
    ["3", "carol", "carol@example.com"],
];

/// Columns of the users fixture.
pub const USER_COLUMNS: [&str; 3] = ["id", "username", "email"];

/// Returns the users fixture as a result set.
pub fn users_result() -> ResultSet {
    ResultSet::new(USER_COLUMNS, USERS)
}

/// Returns a memory driver scripted with the users fixture.
pub fn users_driver() -> MemoryDriver {
    MemoryDriver::new()
        .with_result(USERS_QUERY, users_result())
        .with_result(USER_BY_ID, ResultSet::new(USER_COLUMNS, [USERS[0]]))
        .with_affected(USERS_DELETE, USERS.len() as u64)
}

/// A test bridge with its driver kept for inspection.
pub struct TestBridge {
    /// The bridge instance.
    pub bridge: Bridge,
    /// The scripted driver, if the bridge is memory-backed.
    pub driver: Option<MemoryDriver>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestBridge {
    /// Creates a bridge over the scripted users fixture.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a scripted bridge with the given configuration.
    pub fn memory_with_config(config: Config) -> Self {
        let driver = users_driver();
        Self {
            bridge: Bridge::with_config(config, driver.clone()),
            driver: Some(driver),
            _temp_dir: None,
        }
    }

    /// Creates a SQLite bridge whose database lives in a temporary directory.
    ///
    /// The `users` table is created and filled with the fixture rows.
    pub fn sqlite_file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let test = Self {
            bridge: Bridge::new(SqliteDriver::new()),
            driver: None,
            _temp_dir: Some(temp_dir),
        };
        let conn_string = test.conn_string().expect("file bridge should have a path");
        scenarios::seed_users(&test.bridge, &conn_string);
        test
    }

    /// Returns the database path if file-based, None otherwise.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("test.sqlite"))
    }

    /// Returns a connection string for the file database.
    pub fn conn_string(&self) -> Option<String> {
        self.path().map(|p| format!("sqlite://{}", p.display()))
    }
}

impl std::ops::Deref for TestBridge {
    type Target = Bridge;

    fn deref(&self) -> &Self::Target {
        &self.bridge
    }
}

/// Runs a test with a scripted users bridge.
pub fn with_test_bridge<F, R>(f: F) -> R
where
    F: FnOnce(&Bridge) -> R,
{
    let test = TestBridge::memory();
    f(&test.bridge)
}

/// Runs a test with a SQLite bridge seeded with the users table.
///
/// The closure also receives a connection string for the seeded database.
pub fn with_sqlite_bridge<F, R>(f: F) -> R
where
    F: FnOnce(&Bridge, &str) -> R,
{
    let test = TestBridge::sqlite_file();
    let conn_string = test.conn_string().expect("file bridge should have a path");
    f(&test.bridge, &conn_string)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use sqlbridge_core::RawHandle;

    /// Creates the users table on a fresh database and fills it.
    pub fn seed_users(bridge: &Bridge, conn_string: &str) {
        let conn = bridge.create_connection(conn_string);
        assert!(conn > 0, "seed connection failed: {:?}", sqlbridge_core::last_error());

        let created = bridge.execute_non_query(
            conn,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, username TEXT, email TEXT)",
        );
        assert_eq!(created, 0, "create failed: {:?}", sqlbridge_core::last_error());

        for [id, username, email] in USERS {
            let stmt = bridge.prepare_statement(conn, "INSERT INTO users VALUES (?, ?, ?)");
            assert!(bridge.bind_int(stmt, 1, id.parse().expect("fixture ids are numeric")));
            assert!(bridge.bind_string(stmt, 2, username));
            assert!(bridge.bind_string(stmt, 3, email));
            assert_eq!(bridge.execute_prepared_non_query(stmt), 1);
            bridge.close_statement(stmt);
        }
        bridge.close_connection(conn);
    }

    /// Opens `count` connections and runs the users query once on each.
    ///
    /// Returns `(connection, result)` pairs.
    pub fn connections_with_results(bridge: &Bridge, count: usize) -> Vec<(RawHandle, RawHandle)> {
        (0..count)
            .map(|i| {
                let conn = bridge.create_connection(&format!("memory://fixture-{i}"));
                let res = bridge.execute_query(conn, USERS_QUERY);
                (conn, res)
            })
            .collect()
    }
}
