//! Exec command implementation.

use super::{connect, failure};
use sqlbridge_core::INVALID_COUNT;
use std::io::Write;

/// Runs the exec command, printing affected rows to stdout.
pub fn run(conn: &str, statements: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    run_statements(conn, statements, &mut stdout.lock())
}

/// Runs each statement in order on one connection.
///
/// Stops at the first failing statement.
pub fn run_statements(
    conn: &str,
    statements: &[String],
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let (bridge, handle) = connect(conn)?;

    for (i, sql) in statements.iter().enumerate() {
        let affected = bridge.execute_non_query(handle, sql);
        if affected == INVALID_COUNT {
            return Err(failure(&format!("statement {} failed", i + 1)));
        }
        writeln!(out, "{affected} row(s) affected")?;
    }

    bridge.close_connection(handle);
    Ok(())
}
