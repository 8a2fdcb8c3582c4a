//! Process-wide serialisation ceiling.
//!
//! Every conversion from a structured value to canonical text is bounded by
//! the active ceiling: rendering that would exceed it fails with
//! [`DsError::BufferTooSmall`](crate::DsError::BufferTooSmall) instead of
//! truncating. The ceiling is stored per thread -- the engine is
//! single-threaded by contract, and threads must not observe each other's
//! overrides.

use std::cell::Cell;

/// Ceiling applied when no override is in effect.
pub const DEFAULT_CAPACITY: usize = 1024;

thread_local! {
    static CAPACITY: Cell<usize> = const { Cell::new(DEFAULT_CAPACITY) };
}

/// Read the active serialisation ceiling in bytes.
#[inline]
pub fn capacity() -> usize {
    CAPACITY.with(Cell::get)
}

/// Set the serialisation ceiling, returning the previous value.
///
/// A `size` of zero leaves the ceiling unchanged (read-only probe).
pub fn set_capacity(size: usize) -> usize {
    CAPACITY.with(|cell| {
        let previous = cell.get();
        if size > 0 {
            cell.set(size);
        }
        previous
    })
}

/// Guard returned by [`scoped`]; restores the previous ceiling on drop.
///
/// Restoration runs on every exit path, including early returns and panic
/// unwinding.
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct ScopedCapacity {
    previous: usize,
}

/// Override the ceiling for the lifetime of the returned guard.
pub fn scoped(size: usize) -> ScopedCapacity {
    ScopedCapacity {
        previous: set_capacity(size),
    }
}

impl Drop for ScopedCapacity {
    fn drop(&mut self) {
        set_capacity(self.previous);
    }
}
