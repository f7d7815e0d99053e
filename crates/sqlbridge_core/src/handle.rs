//! Handle type and allocator.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Raw handle value as seen by foreign callers.
///
/// `0` is the invalid sentinel; negative values are never issued either.
pub type RawHandle = i64;

/// The invalid-handle sentinel returned when an operation fails.
pub const INVALID_HANDLE: RawHandle = 0;

/// An issued, non-zero handle.
///
/// Handles are monotonically increasing within the registry that issued
/// them and are never reused, even after the resource behind them is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU64);

impl Handle {
    /// Interprets a raw boundary value as a handle.
    ///
    /// Returns `None` for `0` and for negative values, which can never
    /// address a live resource.
    #[must_use]
    pub fn from_raw(raw: RawHandle) -> Option<Self> {
        u64::try_from(raw).ok().and_then(NonZeroU64::new).map(Self)
    }

    /// Returns the value handed to foreign callers.
    #[must_use]
    pub const fn as_raw(self) -> RawHandle {
        // The allocator never issues values above i64::MAX.
        self.0.get() as RawHandle
    }

    /// Returns the handle as an unsigned integer.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The namespace a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A database connection.
    Connection,
    /// A materialized query result.
    Result,
    /// A prepared statement.
    Statement,
}

impl HandleKind {
    /// Returns a lower-case name for messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HandleKind::Connection => "connection",
            HandleKind::Result => "result",
            HandleKind::Statement => "statement",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues unique handles for one registry.
///
/// The sequence starts at 1 and only ever grows. Allocation is a single
/// atomic increment, so concurrent callers never observe duplicates.
#[derive(Debug)]
pub struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    /// Creates an allocator whose first handle is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issues the next handle.
    ///
    /// # Panics
    ///
    /// Panics once the positive `i64` range is exhausted. At one handle per
    /// nanosecond that takes close to three centuries.
    pub fn next(&self) -> Handle {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(
            value <= i64::MAX as u64,
            "handle space exhausted after {} allocations",
            i64::MAX
        );
        match NonZeroU64::new(value) {
            Some(v) => Handle(v),
            None => unreachable!("allocator starts at 1"),
        }
    }

    /// Returns how many handles have been issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}
