//! Status codes, last-error access and panic guarding.

use sqlbridge_core::{clear_last_error, last_error, set_last_error};
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Status code for lifecycle functions.
///
/// Data operations report failure through their sentinel return values;
/// only `sqlbridge_init`, `sqlbridge_shutdown` and `sqlbridge_stats` return
/// a status.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBridgeStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Null pointer.
    NullPointer = 3,
    /// The bridge has not been initialized.
    NotInitialized = 4,
    /// The bridge is already initialized.
    AlreadyInitialized = 5,
    /// Feature not supported in this build.
    NotSupported = 6,
    /// A panic was caught at the boundary.
    Panic = 7,
}

impl SqlBridgeStatus {
    /// Returns true if the status indicates success.
    pub fn is_ok(self) -> bool {
        self == SqlBridgeStatus::Ok
    }

    /// Returns true if the status indicates an error.
    pub fn is_err(self) -> bool {
        self != SqlBridgeStatus::Ok
    }
}

/// Status code type for C compatibility.
pub type StatusCode = i32;

impl From<SqlBridgeStatus> for StatusCode {
    fn from(status: SqlBridgeStatus) -> Self {
        status as StatusCode
    }
}

// C copy of the core's last error, kept alive until the next read
thread_local! {
    static LAST_ERROR_C: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Gets the last error message for this thread.
///
/// Returns null if the most recent call on this thread succeeded.
///
/// # Safety
///
/// The returned pointer is valid until the next call to this function on
/// the same thread. Do not free it.
#[no_mangle]
pub extern "C" fn sqlbridge_last_error() -> *const c_char {
    let message = last_error().map(|m| {
        let bytes: Vec<u8> = m.into_bytes().into_iter().filter(|&b| b != 0).collect();
        CString::new(bytes).unwrap_or_default()
    });
    LAST_ERROR_C.with(|cell| {
        let mut slot = cell.borrow_mut();
        *slot = message;
        match slot.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => std::ptr::null(),
        }
    })
}

/// Clears the last error message for this thread.
#[no_mangle]
pub extern "C" fn sqlbridge_clear_error() {
    clear_last_error();
    LAST_ERROR_C.with(|cell| *cell.borrow_mut() = None);
}

/// Runs `f`, turning a panic into `fallback` and a last-error message.
///
/// Unwinding across `extern "C"` is undefined behavior, so every export
/// goes through here.
pub(crate) fn guard<T>(op: &'static str, fallback: impl FnOnce() -> T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(op, %detail, "panic caught at ffi boundary");
            set_last_error(format!("{op} panicked: {detail}"));
            fallback()
        }
    }
}
