//! Property-based test generators using proptest.
//!
//! Provides strategies for result shapes, bind parameters and sequences of
//! handle operations.

use proptest::prelude::*;
use sqlbridge_core::{Bridge, Param, RawHandle, ResultSet};

/// Strategy for generating column names.
pub fn column_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex")
}

/// Strategy for generating cell text, including the empty string.
pub fn cell_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 @.]{0,12}").expect("Invalid regex")
}

/// Strategy for rectangular results.
pub fn rectangular_result_strategy() -> impl Strategy<Value = ResultSet> {
    (1usize..6, 0usize..8).prop_flat_map(|(cols, rows)| {
        (
            prop::collection::vec(column_name_strategy(), cols),
            prop::collection::vec(prop::collection::vec(cell_strategy(), cols), rows),
        )
            .prop_map(|(columns, rows)| ResultSet::new(columns, rows))
    })
}

/// Strategy for results whose rows may be shorter or longer than the
/// column list.
pub fn ragged_result_strategy() -> impl Strategy<Value = ResultSet> {
    (
        prop::collection::vec(column_name_strategy(), 0..5),
        prop::collection::vec(prop::collection::vec(cell_strategy(), 0..7), 0..8),
    )
        .prop_map(|(columns, rows)| ResultSet::new(columns, rows))
}

/// Strategy for bind parameters.
pub fn param_strategy() -> impl Strategy<Value = Param> {
    prop_oneof![
        Just(Param::Null),
        any::<i64>().prop_map(Param::Int),
        cell_strategy().prop_map(Param::Text),
    ]
}

/// Strategy for raw handle values a foreign caller might pass, valid or not.
pub fn raw_handle_strategy() -> impl Strategy<Value = RawHandle> {
    prop_oneof![
        Just(0),
        Just(-1),
        Just(i64::MIN),
        Just(i64::MAX),
        1i64..64,
    ]
}

/// A single operation against a bridge.
///
/// Indices pick among the handles issued so far, modulo their count.
#[derive(Debug, Clone)]
pub enum HandleOp {
    /// Open a connection.
    Open,
    /// Close a previously opened connection.
    Close(usize),
    /// Run the query on a previously opened connection.
    Query(usize),
    /// Free a previously produced result.
    Free(usize),
    /// Read a cell of a previously produced result.
    Read(usize, i64, i64),
}

/// Strategy for generating a handle operation.
pub fn handle_op_strategy() -> impl Strategy<Value = HandleOp> {
    prop_oneof![
        2 => Just(HandleOp::Open),
        1 => any::<usize>().prop_map(HandleOp::Close),
        3 => any::<usize>().prop_map(HandleOp::Query),
        2 => any::<usize>().prop_map(HandleOp::Free),
        3 => (any::<usize>(), -2i64..6, -2i64..6).prop_map(|(i, r, c)| HandleOp::Read(i, r, c)),
    ]
}

/// Strategy for generating a sequence of handle operations.
pub fn handle_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<HandleOp>> {
    prop::collection::vec(handle_op_strategy(), 1..max_len)
}

/// What [`apply_ops`] observed.
#[derive(Debug, Default, Clone)]
pub struct OpsTrace {
    /// Every connection handle returned, in order.
    pub connections: Vec<RawHandle>,
    /// Every result handle returned, in order.
    pub results: Vec<RawHandle>,
    /// Connections closed so far.
    pub closed: Vec<RawHandle>,
    /// Results freed so far.
    pub freed: Vec<RawHandle>,
}

/// Applies operations to `bridge`, running `query` for every `Query` step.
pub fn apply_ops(bridge: &Bridge, query: &str, ops: &[HandleOp]) -> OpsTrace {
    let mut trace = OpsTrace::default();

    for op in ops {
        match *op {
            HandleOp::Open => {
                let h = bridge.create_connection("memory://ops");
                trace.connections.push(h);
            }
            HandleOp::Close(i) => {
                if let Some(&h) = pick(&trace.connections, i) {
                    bridge.close_connection(h);
                    trace.closed.push(h);
                }
            }
            HandleOp::Query(i) => {
                if let Some(&h) = pick(&trace.connections, i) {
                    let r = bridge.execute_query(h, query);
                    if r != 0 {
                        trace.results.push(r);
                    }
                }
            }
            HandleOp::Free(i) => {
                if let Some(&r) = pick(&trace.results, i) {
                    bridge.free_result(r);
                    trace.freed.push(r);
                }
            }
            HandleOp::Read(i, row, col) => {
                if let Some(&r) = pick(&trace.results, i) {
                    let _ = bridge.get_value(r, row, col);
                }
            }
        }
    }

    trace
}

fn pick<T>(items: &[T], index: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(index % items.len())
    }
}
