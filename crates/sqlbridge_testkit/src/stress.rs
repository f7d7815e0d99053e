//! Stress tests for SqlBridge.
//!
//! These tests drive the handle registries from many threads at once and
//! count how many operations returned a success value.

use crate::fixtures::{USERS, USERS_QUERY};
use sqlbridge_core::{Bridge, INVALID_HANDLE};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform, split across threads.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Results each thread keeps alive before freeing the oldest.
    pub retained_results: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            retained_results: 16,
        }
    }
}

#[derive(Default)]
struct Counters {
    successful: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn record(&self, ok: bool) {
        if ok {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn finish(&self, start: Instant) -> StressTestResult {
        StressTestResult::new(
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

fn run_threads<F>(config: &StressConfig, f: F) -> StressTestResult
where
    F: Fn(usize, usize, &Counters) + Send + Sync + 'static,
{
    let counters = Arc::new(Counters::default());
    let f = Arc::new(f);
    let ops_per_thread = config.operations / config.threads.max(1);
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads.max(1))
        .map(|t| {
            let counters = Arc::clone(&counters);
            let f = Arc::clone(&f);
            thread::spawn(move || f(t, ops_per_thread, &counters))
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}

/// Runs queries from every thread, each on its own connection.
///
/// Every produced result is read back and eventually freed. The bridge must
/// answer [`USERS_QUERY`] with the users fixture.
pub fn stress_concurrent_queries(bridge: Arc<Bridge>, config: &StressConfig) -> StressTestResult {
    let retained = config.retained_results.max(1);
    run_threads(config, move |t, ops, counters| {
        let conn = bridge.create_connection(&format!("memory://stress-{t}"));
        let mut live = std::collections::VecDeque::with_capacity(retained);

        for i in 0..ops {
            let res = bridge.execute_query(conn, USERS_QUERY);
            let row = (i % USERS.len()) as i64;
            let ok = res != INVALID_HANDLE && bridge.get_value(res, row, 1) == USERS[row as usize][1];
            counters.record(ok);

            live.push_back(res);
            if live.len() > retained {
                if let Some(old) = live.pop_front() {
                    bridge.free_result(old);
                }
            }
        }
        for res in live {
            bridge.free_result(res);
        }
        bridge.close_connection(conn);
    })
}

/// Opens and closes connections as fast as possible.
pub fn stress_connection_churn(bridge: Arc<Bridge>, config: &StressConfig) -> StressTestResult {
    run_threads(config, move |t, ops, counters| {
        for i in 0..ops {
            let conn = bridge.create_connection(&format!("memory://churn-{t}-{i}"));
            counters.record(conn != INVALID_HANDLE);
            bridge.close_connection(conn);
        }
    })
}

/// Queries one shared connection while another thread closes it.
///
/// Queries that lose the race fail cleanly; none may panic or return a
/// handle that reads as anything but the fixture.
pub fn stress_close_while_querying(bridge: Arc<Bridge>, config: &StressConfig) -> StressTestResult {
    let conn = bridge.create_connection("memory://shared");
    let closer = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(1));
            bridge.close_connection(conn);
        })
    };

    let result = run_threads(config, move |_, ops, counters| {
        for _ in 0..ops {
            let res = bridge.execute_query(conn, USERS_QUERY);
            if res == INVALID_HANDLE {
                counters.record(false);
                continue;
            }
            counters.record(bridge.get_row_count(res) == USERS.len() as i64);
            bridge.free_result(res);
        }
    });

    closer.join().expect("Thread panicked");
    result
}

/// Reads one result from many threads while it is freed.
///
/// A read counts as successful when it returns either the live value or the
/// freed sentinel.
pub fn stress_free_while_reading(bridge: Arc<Bridge>, config: &StressConfig) -> StressTestResult {
    let conn = bridge.create_connection("memory://reader");
    let res = bridge.execute_query(conn, USERS_QUERY);
    let freed = Arc::new(AtomicBool::new(false));

    let freer = {
        let bridge = Arc::clone(&bridge);
        let freed = Arc::clone(&freed);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(1));
            bridge.free_result(res);
            freed.store(true, Ordering::SeqCst);
        })
    };

    let result = run_threads(config, move |_, ops, counters| {
        for _ in 0..ops {
            let was_freed = freed.load(Ordering::SeqCst);
            let value = bridge.get_value(res, 0, 1);
            let ok = if was_freed {
                value.is_empty()
            } else {
                value == USERS[0][1] || value.is_empty()
            };
            counters.record(ok);
        }
    });

    freer.join().expect("Thread panicked");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::users_driver;
    use sqlbridge_core::Config;

    fn create_test_bridge() -> Arc<Bridge> {
        Arc::new(Bridge::with_config(Config::new().shard_count(4), users_driver()))
    }

    #[test]
    fn test_concurrent_queries() {
        let bridge = create_test_bridge();
        let config = StressConfig {
            operations: 2_000,
            threads: 4,
            retained_results: 8,
        };

        let result = stress_concurrent_queries(Arc::clone(&bridge), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 2_000);

        let stats = bridge.stats();
        assert_eq!(stats.live_results, 0);
        assert_eq!(stats.live_connections, 0);
        assert_eq!(stats.results_freed, 2_000);
    }

    #[test]
    fn test_connection_churn() {
        let bridge = create_test_bridge();
        let config = StressConfig {
            operations: 1_000,
            ..Default::default()
        };

        let result = stress_connection_churn(Arc::clone(&bridge), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(bridge.stats().connections_opened, 1_000);
        assert_eq!(bridge.stats().live_connections, 0);
    }

    #[test]
    fn test_close_while_querying() {
        let bridge = create_test_bridge();
        let config = StressConfig {
            operations: 4_000,
            ..Default::default()
        };

        let result = stress_close_while_querying(Arc::clone(&bridge), &config);
        assert_eq!(result.total_ops, 4_000);
        // Every query after the close must fail.
        let conn = 1;
        assert_eq!(bridge.execute_query(conn, USERS_QUERY), INVALID_HANDLE);
        assert_eq!(bridge.stats().live_results, 0);
    }

    #[test]
    fn test_free_while_reading() {
        let bridge = create_test_bridge();
        let config = StressConfig {
            operations: 4_000,
            ..Default::default()
        };

        let result = stress_free_while_reading(bridge, &config);
        assert_eq!(result.failed_ops, 0);
    }

    #[test]
    fn test_result_summary() {
        let result = StressTestResult::new(3, 1, Duration::from_secs(2));
        assert_eq!(result.total_ops, 4);
        assert!((result.ops_per_second - 2.0).abs() < f64::EPSILON);
    }
}
