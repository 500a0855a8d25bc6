// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport identity.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// A handle identifying one tracked element.
///
/// Handles are handed out by an [`IdAllocator`] in strictly increasing order
/// and are never reused, so a handle that outlives its element can never
/// alias a newer one. An allocator stops after `u32::MAX` handles rather than
/// wrapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportId(pub(crate) u32);

impl ViewportId {
    /// Returns the raw counter value (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Rebuilds a handle from [`index`](Self::index), e.g. when replaying a
    /// recording. Such handles are not tracked by any allocator.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Debug for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewportId({})", self.0)
    }
}

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vp#{}", self.0)
    }
}

/// Monotonic source of [`ViewportId`]s.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first handle is `ViewportId(0)`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a fresh handle, or `None` once the counter is exhausted.
    pub fn allocate(&mut self) -> Option<ViewportId> {
        let id = ViewportId(self.next);
        self.next = self.next.checked_add(1)?;
        Some(id)
    }

    /// Number of handles allocated so far.
    #[must_use]
    pub const fn allocated(&self) -> u32 {
        self.next
    }
}

/// An [`IdAllocator`] usable through a shared reference, e.g. from a
/// `static` when trackers are created from unrelated call sites.
#[derive(Debug, Default)]
pub struct SharedIdAllocator {
    next: AtomicU32,
}

impl SharedIdAllocator {
    /// Creates an allocator whose first handle is `ViewportId(0)`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Returns a fresh handle, or `None` once the counter is exhausted.
    pub fn allocate(&self) -> Option<ViewportId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .ok()
            .map(ViewportId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate().unwrap();
        let b = ids.allocate().unwrap();
        let c = ids.allocate().unwrap();
        assert!(a < b && b < c, "handles must increase");
        assert_eq!(ids.allocated(), 3);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn shared_allocator_never_repeats() {
        static IDS: SharedIdAllocator = SharedIdAllocator::new();
        let a = IDS.allocate().unwrap();
        let b = IDS.allocate().unwrap();
        assert!(b > a, "shared handles must increase");
    }

    #[test]
    fn exhausted_allocator_stops_instead_of_wrapping() {
        let mut ids = IdAllocator {
            next: u32::MAX - 1,
        };
        assert_eq!(ids.allocate(), Some(ViewportId(u32::MAX - 1)));
        assert_eq!(ids.allocate(), None);
        assert_eq!(ids.allocate(), None);

        let shared = SharedIdAllocator {
            next: AtomicU32::new(u32::MAX - 1),
        };
        assert_eq!(shared.allocate(), Some(ViewportId(u32::MAX - 1)));
        assert_eq!(shared.allocate(), None);
    }

    #[test]
    fn debug_and_display() {
        let id = ViewportId(7);
        assert_eq!(alloc::format!("{id:?}"), "ViewportId(7)");
        assert_eq!(alloc::format!("{id}"), "vp#7");
    }
}
