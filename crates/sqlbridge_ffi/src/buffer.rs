//! String buffers for FFI.

use std::ffi::{c_char, CStr, CString};

/// A string returned to foreign callers.
///
/// Null-terminated UTF-8, owned by Rust. Call `sqlbridge_free_string` to
/// release it. Interior NUL bytes in the source text are dropped so the
/// terminator stays unambiguous.
#[repr(C)]
#[derive(Debug)]
pub struct SqlBridgeString {
    /// Pointer to the null-terminated string.
    pub ptr: *mut c_char,
    /// Length in bytes, not including the terminator.
    pub len: usize,
}

impl SqlBridgeString {
    /// Copies a Rust string into a new FFI string.
    pub fn from_str(s: &str) -> Self {
        let cstring = CString::new(s).unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        });
        let len = cstring.as_bytes().len();
        Self {
            ptr: cstring.into_raw(),
            len,
        }
    }

    /// Returns an allocated empty string.
    ///
    /// Failure sentinels are real empty strings, never null, so callers can
    /// free every returned value the same way.
    pub fn empty() -> Self {
        Self::from_str("")
    }

    /// Returns true if the string is null.
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Borrows the contents.
    ///
    /// # Safety
    ///
    /// The pointer must still be owned by this string.
    pub unsafe fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        CStr::from_ptr(self.ptr).to_str().ok()
    }
}

/// Reads a borrowed C string argument.
///
/// Returns `None` for null pointers and invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a valid null-terminated string that
/// outlives the returned slice.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Frees a string returned by SqlBridge.
///
/// # Safety
///
/// The string must have been returned by a SqlBridge function and not freed
/// before.
#[no_mangle]
pub unsafe extern "C" fn sqlbridge_free_string(string: SqlBridgeString) {
    if !string.ptr.is_null() {
        drop(CString::from_raw(string.ptr));
    }
}
