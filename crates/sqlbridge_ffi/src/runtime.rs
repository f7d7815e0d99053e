//! Process-wide bridge lifecycle.
//!
//! Foreign callers cannot hold a Rust value, so the C ABI keeps exactly one
//! [`Bridge`] in a process-level slot. `sqlbridge_init` fills it and
//! `sqlbridge_shutdown` empties it; every other export borrows it.

use crate::buffer::read_str;
use crate::error::{guard, SqlBridgeStatus};
use crate::types::{SqlBridgeConfig, SqlBridgeStats};
use parking_lot::RwLock;
use sqlbridge_core::{clear_last_error, set_last_error, Bridge, Config, Driver, MemoryDriver};
use std::ffi::c_char;
use std::sync::Arc;

static BRIDGE: RwLock<Option<Arc<Bridge>>> = parking_lot::const_rwlock(None);

#[cfg(feature = "sqlite")]
const DEFAULT_DRIVER: &str = "sqlite";
#[cfg(not(feature = "sqlite"))]
const DEFAULT_DRIVER: &str = "memory";

fn current() -> Option<Arc<Bridge>> {
    BRIDGE.read().clone()
}

fn driver_by_name(name: &str) -> Option<Arc<dyn Driver>> {
    match name {
        "memory" => Some(Arc::new(MemoryDriver::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Some(Arc::new(sqlbridge_core::SqliteDriver::new())),
        _ => None,
    }
}

/// Runs `f` against the installed bridge.
///
/// Returns `fallback()` and sets the last error when no bridge is installed
/// or `f` panics.
pub(crate) fn with_bridge<T>(
    op: &'static str,
    fallback: impl Fn() -> T,
    f: impl FnOnce(&Bridge) -> T,
) -> T {
    guard(op, &fallback, || match current() {
        Some(bridge) => f(&bridge),
        None => {
            set_last_error(format!("{op}: bridge is not initialized"));
            fallback()
        }
    })
}

/// Reports a null or non-UTF-8 string argument and returns `fallback`.
pub(crate) fn bad_string<T>(op: &'static str, arg: &'static str, fallback: T) -> T {
    tracing::debug!(op, arg, "rejected string argument");
    set_last_error(format!("{op}: {arg} is null or not valid UTF-8"));
    fallback
}

#[cfg(test)]
pub(crate) fn install(bridge: Bridge) {
    *BRIDGE.write() = Some(Arc::new(bridge));
}

#[cfg(test)]
pub(crate) fn uninstall() {
    if let Some(bridge) = BRIDGE.write().take() {
        bridge.shutdown();
    }
}

/// Exports share one process-wide slot; tests that touch it hold this lock.
#[cfg(test)]
pub(crate) static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

/// Initializes the bridge.
///
/// # Arguments
///
/// * `config` - Registry configuration, or null for defaults
/// * `driver_name` - `"sqlite"` or `"memory"`, or null for the default driver
///
/// # Returns
///
/// `SqlBridgeStatus::Ok` on success. Initializing twice without a shutdown in
/// between returns `AlreadyInitialized` and leaves the running bridge alone.
///
/// # Safety
///
/// - `config` must be null or point to a valid `SqlBridgeConfig`
/// - `driver_name` must be null or a valid null-terminated string
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_init(
    config: *const SqlBridgeConfig,
    driver_name: *const c_char,
) -> SqlBridgeStatus {
    guard(
        "sqlbridge_init",
        || SqlBridgeStatus::Panic,
        || {
            clear_last_error();

            let config = if config.is_null() {
                Config::default()
            } else {
                (*config).to_config()
            };

            let name = if driver_name.is_null() {
                DEFAULT_DRIVER
            } else {
                match read_str(driver_name) {
                    Some(name) => name,
                    None => {
                        set_last_error("driver name is not valid UTF-8");
                        return SqlBridgeStatus::InvalidArgument;
                    }
                }
            };

            let Some(driver) = driver_by_name(name) else {
                set_last_error(format!("driver '{name}' is not available in this build"));
                return SqlBridgeStatus::NotSupported;
            };

            let mut slot = BRIDGE.write();
            if slot.is_some() {
                set_last_error("bridge is already initialized");
                return SqlBridgeStatus::AlreadyInitialized;
            }
            tracing::info!(driver = name, shards = config.shard_count, "bridge initialized");
            *slot = Some(Arc::new(Bridge::with_shared_driver(config, driver)));
            SqlBridgeStatus::Ok
        },
    )
}

/// Shuts the bridge down, closing every live connection.
///
/// Every handle issued so far becomes dead. Calls made afterwards fail with
/// their sentinel until `sqlbridge_init` runs again.
#[no_mangle]
pub extern "C" fn sqlbridge_shutdown() -> SqlBridgeStatus {
    guard(
        "sqlbridge_shutdown",
        || SqlBridgeStatus::Panic,
        || {
            clear_last_error();
            // Release the slot before closing so other threads are not blocked.
            let Some(bridge) = BRIDGE.write().take() else {
                set_last_error("bridge is not initialized");
                return SqlBridgeStatus::NotInitialized;
            };
            bridge.shutdown();
            SqlBridgeStatus::Ok
        },
    )
}

/// Writes the current statistics into `out`.
///
/// # Safety
///
/// `out` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_stats(out: *mut SqlBridgeStats) -> SqlBridgeStatus {
    if out.is_null() {
        set_last_error("null pointer argument");
        return SqlBridgeStatus::NullPointer;
    }
    let stats = with_bridge(
        "sqlbridge_stats",
        || None,
        |bridge| Some(SqlBridgeStats::from(bridge.stats())),
    );
    match stats {
        Some(stats) => {
            *out = stats;
            clear_last_error();
            SqlBridgeStatus::Ok
        }
        None => SqlBridgeStatus::NotInitialized,
    }
}
