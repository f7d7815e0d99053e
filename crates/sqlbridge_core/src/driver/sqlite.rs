//! SQLite driver backed by `rusqlite`.

use crate::driver::{Driver, NativeConnection};
use crate::error::{DriverError, DriverResult};
use crate::resource::{Param, ResultSet};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;

/// Opens SQLite databases.
///
/// Accepted connection strings:
/// - `:memory:` or `sqlite::memory:` for a private in-memory database
/// - `sqlite://<path>` or a bare `<path>` for a database file
///
/// Cells are rendered as strings: NULL becomes `""`, numbers use their
/// `Display` form, text is passed through and blobs become lower-case hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn open(&self, conn_string: &str) -> DriverResult<Box<dyn NativeConnection>> {
        let target = conn_string.strip_prefix("sqlite://").unwrap_or(conn_string);
        let conn = match target {
            "" => return Err(DriverError::connect("empty connection string")),
            ":memory:" | "sqlite::memory:" => Connection::open_in_memory()?,
            path => Connection::open(Path::new(path))?,
        };
        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: Connection,
}

impl NativeConnection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &[Param]) -> DriverResult<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut result = ResultSet::with_columns(stmt.column_names());

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(render(row.get_ref(i)?));
            }
            result.push_row(cells);
        }
        Ok(result)
    }

    fn execute_non_query(&mut self, sql: &str, params: &[Param]) -> DriverResult<u64> {
        let affected = self.conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(affected as u64)
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.conn.close().map_err(|(_, e)| DriverError::Sqlite(e))
    }
}

impl ToSql for Param {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Param::Null => ToSqlOutput::from(rusqlite::types::Null),
            Param::Int(v) => ToSqlOutput::from(*v),
            Param::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_memory() -> Box<dyn NativeConnection> {
        SqliteDriver::new().open(":memory:").unwrap()
    }

    #[test]
    fn sqlite_round_trip() {
        let mut conn = open_memory();
        conn.execute_non_query("CREATE TABLE users (id INTEGER, name TEXT)", &[])
            .unwrap();
        let n = conn
            .execute_non_query(
                "INSERT INTO users VALUES (?1, ?2), (?3, ?4)",
                &[
                    Param::Int(1),
                    Param::from("alice"),
                    Param::Int(2),
                    Param::from("bob"),
                ],
            )
            .unwrap();
        assert_eq!(n, 2);

        let rs = conn
            .execute("SELECT id, name FROM users ORDER BY id", &[])
            .unwrap();
        assert_eq!(rs.columns(), ["id", "name"]);
        assert_eq!(rs.cell(0, 1), Some("alice"));
        assert_eq!(rs.cell(1, 0), Some("2"));
        conn.close().unwrap();
    }

    #[test]
    fn sqlite_renders_cells_as_strings() {
        let mut conn = open_memory();
        let rs = conn
            .execute("SELECT NULL, 1.5, x'0aff', 'txt'", &[])
            .unwrap();
        assert_eq!(rs.cell(0, 0), Some(""));
        assert_eq!(rs.cell(0, 1), Some("1.5"));
        assert_eq!(rs.cell(0, 2), Some("0aff"));
        assert_eq!(rs.cell(0, 3), Some("txt"));
    }

    #[test]
    fn sqlite_reports_errors() {
        let mut conn = open_memory();
        assert!(matches!(
            conn.execute("SELEC nonsense", &[]),
            Err(DriverError::Sqlite(_))
        ));
        assert!(conn.execute_non_query("DELETE FROM missing", &[]).is_err());
        assert!(SqliteDriver::new().open("").is_err());
    }

    #[test]
    fn sqlite_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");
        let conn_string = format!("sqlite://{}", path.display());

        let mut conn = SqliteDriver::new().open(&conn_string).unwrap();
        conn.execute_non_query("CREATE TABLE t (v TEXT)", &[]).unwrap();
        conn.execute_non_query("INSERT INTO t VALUES ('kept')", &[])
            .unwrap();
        conn.close().unwrap();

        let mut conn = SqliteDriver::new().open(&conn_string).unwrap();
        let rs = conn.execute("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rs.cell(0, 0), Some("kept"));
    }
}
