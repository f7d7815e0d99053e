//! End-to-end handle lifecycle tests through the sentinel API.

use proptest::prelude::*;
use sqlbridge_core::{Bridge, Config, MemoryDriver, ResultSet, INVALID_COUNT, INVALID_HANDLE};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn users_driver() -> MemoryDriver {
    MemoryDriver::new()
        .with_result(
            "SELECT id, name FROM users",
            ResultSet::new(["id", "name"], [["1", "alice"], ["2", "bob"]]),
        )
        .with_result("SELECT a, b, c FROM ragged", ResultSet::new(["a", "b", "c"], [vec!["x", "y"]]))
        .with_affected("DELETE FROM users", 2)
}

#[test]
fn unknown_connection_query_returns_zero() {
    let driver = users_driver();
    let bridge = Bridge::new(driver.clone());

    assert_eq!(bridge.execute_query(999, "SELECT 1"), INVALID_HANDLE);
    assert!(driver.executed().is_empty());
}

#[test]
fn non_query_on_closed_connection_returns_minus_one() {
    let bridge = Bridge::new(users_driver());
    let conn = bridge.create_connection("memory://users");
    assert!(conn > 0);
    assert_eq!(bridge.execute_non_query(conn, "DELETE FROM users"), 2);

    bridge.close_connection(conn);
    assert_eq!(bridge.execute_non_query(conn, "DELETE FROM users"), INVALID_COUNT);
}

#[test]
fn ragged_row_reads_empty_string() {
    let bridge = Bridge::new(users_driver());
    let conn = bridge.create_connection("memory://ragged");
    let res = bridge.execute_query(conn, "SELECT a, b, c FROM ragged");

    assert_eq!(bridge.get_value(res, 0, 2), "");
    assert_eq!(bridge.get_value(res, 0, 1), "y");
    assert_eq!(bridge.get_column_count(res), 3);

    let maps = bridge.result_to_mapping(res);
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn mapping_round_trip() {
    let bridge = Bridge::new(users_driver());
    let conn = bridge.create_connection("memory://users");
    let res = bridge.execute_query(conn, "SELECT id, name FROM users");

    let json = serde_json::to_value(bridge.result_to_mapping(res)).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"id": "1", "name": "alice"},
            {"id": "2", "name": "bob"}
        ])
    );
    assert!(bridge.result_to_mapping(res + 1).is_empty());
}

#[test]
fn freed_result_never_resurrects() {
    let bridge = Bridge::new(users_driver());
    let conn = bridge.create_connection("memory://users");
    let res = bridge.execute_query(conn, "SELECT id, name FROM users");
    assert_eq!(bridge.get_row_count(res), 2);

    bridge.free_result(res);
    bridge.free_result(res);

    // New results never take the freed value.
    for _ in 0..10 {
        let next = bridge.execute_query(conn, "SELECT id, name FROM users");
        assert_ne!(next, res);
    }
    assert_eq!(bridge.get_row_count(res), 0);
    assert_eq!(bridge.get_column_count(res), 0);
    assert_eq!(bridge.get_value(res, 0, 0), "");
    assert!(bridge.result_to_mapping(res).is_empty());
}

#[test]
fn double_close_matches_single_close() {
    let once = users_driver();
    let twice = users_driver();
    let a = Bridge::new(once.clone());
    let b = Bridge::new(twice.clone());

    let ha = a.create_connection("memory://x");
    let hb = b.create_connection("memory://x");
    a.close_connection(ha);
    b.close_connection(hb);
    b.close_connection(hb);

    assert_eq!(once.closed(), twice.closed());
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn connection_and_result_namespaces_are_independent() {
    let bridge = Bridge::new(users_driver());
    let conn = bridge.create_connection("memory://users");
    let res = bridge.execute_query(conn, "SELECT id, name FROM users");

    // Both registries start at 1.
    assert_eq!(conn, 1);
    assert_eq!(res, 1);

    bridge.free_result(res);
    assert_eq!(bridge.execute_non_query(conn, "DELETE FROM users"), 2);
}

#[test]
fn prepared_statement_fails_after_connection_close() {
    let driver = users_driver().with_result(
        "SELECT id, name FROM users WHERE id = ?",
        ResultSet::new(["id", "name"], [["1", "alice"]]),
    );
    let bridge = Bridge::new(driver.clone());
    let conn = bridge.create_connection("memory://users");

    let stmt = bridge.prepare_statement(conn, "SELECT id, name FROM users WHERE id = ?");
    assert!(bridge.bind_int(stmt, 1, 1));
    let res = bridge.execute_prepared(stmt);
    assert_eq!(bridge.get_value(res, 0, 1), "alice");

    bridge.close_connection(conn);
    assert_eq!(bridge.execute_prepared(stmt), INVALID_HANDLE);

    bridge.close_statement(stmt);
    assert!(!bridge.bind_int(stmt, 1, 1));
}

#[test]
fn concurrent_callers_never_share_handles() {
    let bridge = Arc::new(Bridge::with_config(Config::new().shard_count(4), users_driver()));

    let threads: Vec<_> = (0..8)
        .map(|t| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                let conn = bridge.create_connection(&format!("memory://t{t}"));
                let mut results = Vec::new();
                for i in 0..200 {
                    let res = bridge.execute_query(conn, "SELECT id, name FROM users");
                    assert!(res > 0);
                    assert_eq!(bridge.get_value(res, 1, 1), "bob");
                    if i % 3 == 0 {
                        bridge.free_result(res);
                    } else {
                        results.push(res);
                    }
                }
                (conn, results)
            })
        })
        .collect();

    let mut conns = HashSet::new();
    let mut results = HashSet::new();
    for t in threads {
        let (conn, res) = t.join().unwrap();
        assert!(conns.insert(conn));
        for r in res {
            assert!(results.insert(r));
        }
    }

    let stats = bridge.stats();
    assert_eq!(stats.live_connections, 8);
    assert_eq!(stats.live_results, results.len() as u64);
    assert_eq!(stats.queries, 1_600);
}

#[test]
fn readers_race_with_free() {
    let bridge = Arc::new(Bridge::new(users_driver()));
    let conn = bridge.create_connection("memory://race");
    let res = bridge.execute_query(conn, "SELECT id, name FROM users");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    // Either the live value or the freed sentinel, nothing else.
                    let v = bridge.get_value(res, 0, 1);
                    assert!(v == "alice" || v.is_empty());
                    let n = bridge.get_row_count(res);
                    assert!(n == 2 || n == 0);
                }
            })
        })
        .collect();

    bridge.free_result(res);
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(bridge.get_row_count(res), 0);
}

proptest! {
    #[test]
    fn get_value_is_bounds_safe(
        columns in prop::collection::vec("[a-z]{1,4}", 0..5),
        rows in prop::collection::vec(prop::collection::vec("[a-z0-9]{0,3}", 0..6), 0..6),
        row in -3i64..10,
        col in -3i64..10,
    ) {
        let driver = MemoryDriver::new().with_result("Q", ResultSet::new(columns.clone(), rows.clone()));
        let bridge = Bridge::new(driver);
        let conn = bridge.create_connection("memory://prop");
        let res = bridge.execute_query(conn, "Q");

        prop_assert_eq!(bridge.get_row_count(res), rows.len() as i64);
        prop_assert_eq!(bridge.get_column_count(res), columns.len() as i64);

        let value = bridge.get_value(res, row, col);
        let in_bounds = row >= 0
            && col >= 0
            && (row as usize) < rows.len()
            && (col as usize) < columns.len()
            && (col as usize) < rows[row as usize].len();
        if in_bounds {
            prop_assert_eq!(&value, &rows[row as usize][col as usize]);
        } else {
            prop_assert_eq!(value, "");
        }
    }

    #[test]
    fn handles_are_unique_per_registry(ops in prop::collection::vec(0u8..4, 1..60)) {
        let bridge = Bridge::new(users_driver());
        let mut conns = vec![bridge.create_connection("memory://p")];
        let mut seen_conns: HashSet<i64> = conns.iter().copied().collect();
        let mut seen_results = HashSet::new();

        for op in ops {
            match op {
                0 => {
                    let h = bridge.create_connection("memory://p");
                    prop_assert!(seen_conns.insert(h));
                    conns.push(h);
                }
                1 => {
                    if let Some(h) = conns.pop() {
                        bridge.close_connection(h);
                        prop_assert_eq!(bridge.execute_query(h, "SELECT id, name FROM users"), 0);
                    }
                }
                _ => {
                    if let Some(&c) = conns.last() {
                        let r = bridge.execute_query(c, "SELECT id, name FROM users");
                        prop_assert!(r > 0);
                        prop_assert!(seen_results.insert(r));
                        if op == 3 {
                            bridge.free_result(r);
                        }
                    }
                }
            }
        }
    }
}
