//! Query command implementation.

use super::{connect, failure};
use sqlbridge_core::{Bridge, RawHandle, INVALID_HANDLE};
use std::io::Write;

/// Runs the query command, printing the result to stdout.
pub fn run(conn: &str, sql: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    render_query(conn, sql, format, &mut stdout.lock())
}

/// Runs one query and writes its result in the given format.
pub fn render_query(
    conn: &str,
    sql: &str,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let (bridge, handle) = connect(conn)?;
    let result = bridge.execute_query(handle, sql);
    if result == INVALID_HANDLE {
        return Err(failure("query failed"));
    }

    match format {
        "json" => {
            let rows = bridge.result_to_mapping(result);
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        }
        "text" => write_table(&bridge, result, out)?,
        other => return Err(format!("unknown format '{other}' (expected text or json)").into()),
    }

    bridge.free_result(result);
    bridge.close_connection(handle);
    Ok(())
}

fn write_table(bridge: &Bridge, result: RawHandle, out: &mut impl Write) -> std::io::Result<()> {
    let rows = bridge.get_row_count(result);
    let cols = bridge.get_column_count(result);

    let header: Vec<String> = match bridge.try_result(result) {
        Ok(rs) => rs.columns().to_vec(),
        Err(_) => Vec::new(),
    };
    let body: Vec<Vec<String>> = (0..rows)
        .map(|r| (0..cols).map(|c| bridge.get_value(result, r, c)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in &body {
        write_row(out, row, &widths)?;
    }
    writeln!(out, "({rows} row{})", if rows == 1 { "" } else { "s" })
}

fn write_row(out: &mut impl Write, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", line.join(" | ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::exec::run_statements;

    fn seeded(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("cli.db");
        let conn = format!("sqlite://{}", path.display());
        run_statements(
            &conn,
            &[
                "CREATE TABLE users (id INTEGER, name TEXT)".to_string(),
                "INSERT INTO users VALUES (1, 'alice'), (2, 'bob')".to_string(),
            ],
            &mut Vec::new(),
        )
        .unwrap();
        conn
    }

    #[test]
    fn text_table() {
        let dir = tempfile::tempdir().unwrap();
        let conn = seeded(&dir);

        let mut out = Vec::new();
        render_query(&conn, "SELECT id, name FROM users ORDER BY id", "text", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "id | name\n-- | -----\n1  | alice\n2  | bob\n(2 rows)\n");
    }

    #[test]
    fn json_output() {
        let dir = tempfile::tempdir().unwrap();
        let conn = seeded(&dir);

        let mut out = Vec::new();
        render_query(&conn, "SELECT name, id FROM users WHERE id = 2", "json", &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, serde_json::json!([{"name": "bob", "id": "2"}]));
    }

    #[test]
    fn bad_sql_reports_driver_error() {
        let mut out = Vec::new();
        let err = render_query(":memory:", "SELEC 1", "text", &mut out).unwrap_err();
        assert!(err.to_string().starts_with("query failed: "));
    }

    #[test]
    fn unknown_format() {
        let mut out = Vec::new();
        let err = render_query(":memory:", "SELECT 1", "yaml", &mut out).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }
}
