//! Benchmark utilities.

#![warn(missing_docs)]

use sqlbridge_core::{Bridge, MemoryDriver, RawHandle, ResultSet};

/// Query text answered by [`grid_bridge`].
pub const GRID_QUERY: &str = "SELECT * FROM grid";

/// Builds a result of `rows` x `cols` cells named `c0..` with values `r:c`.
pub fn grid_result(rows: usize, cols: usize) -> ResultSet {
    let columns: Vec<String> = (0..cols).map(|c| format!("c{c}")).collect();
    let body = (0..rows).map(|r| (0..cols).map(move |c| format!("{r}:{c}")));
    ResultSet::new(columns, body)
}

/// Builds a memory bridge answering [`GRID_QUERY`] with a grid result,
/// plus one open connection and one live result.
pub fn grid_bridge(rows: usize, cols: usize) -> (Bridge, RawHandle, RawHandle) {
    let driver = MemoryDriver::new().with_result(GRID_QUERY, grid_result(rows, cols));
    let bridge = Bridge::new(driver);
    let conn = bridge.create_connection("memory://bench");
    let res = bridge.execute_query(conn, GRID_QUERY);
    (bridge, conn, res)
}
