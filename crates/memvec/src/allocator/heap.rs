//! Heap-forwarding allocator with a fixed per-request ceiling
//!
//! Delegates every request to the platform's default allocator
//! (`std::alloc::System`). Each `allocate` maps 1:1 to one system
//! allocation and each `deallocate` to one system free; the only policy the
//! type adds is the per-request slot ceiling.
//!
//! # Safety
//!
//! - Layouts are derived from `T` and the slot count via `Layout::array`,
//!   so size and alignment always match between allocation and release
//! - Zero-sized requests never reach the system allocator; they are served
//!   with a dangling, well-aligned pointer

use core::alloc::{GlobalAlloc, Layout};
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::alloc::System;

use tracing::trace;

use super::traits::{SlotAllocator, SlotUsage};
use crate::error::{AllocError, AllocResult};

/// Default per-request ceiling, in element slots
pub const DEFAULT_REQUEST_LIMIT: usize = 100;

/// Allocator forwarding each request to the system heap
///
/// Stateless aside from the ceiling, so the type is `Copy` and two instances
/// with the same limit are interchangeable.
pub struct HeapAllocator<T> {
    request_limit: usize,
    _marker: PhantomData<T>,
}

impl<T> HeapAllocator<T> {
    /// Creates a heap allocator with the given per-request ceiling
    pub fn new(request_limit: usize) -> Self {
        HeapAllocator {
            request_limit,
            _marker: PhantomData,
        }
    }

    fn layout_for(&self, count: usize) -> AllocResult<Layout> {
        Layout::array::<T>(count).map_err(|_| AllocError::size_overflow(count))
    }

    /// Moves a block of `old_count` live elements into a block of
    /// `new_count` slots.
    ///
    /// Derived convenience, composed from the primitive operations: acquire
    /// the new block, move the overlapping prefix of
    /// `min(old_count, new_count)` elements, drop the excess when shrinking,
    /// release the old block. On error the old block is untouched and still
    /// owned by the caller.
    ///
    /// # Errors
    ///
    /// [`AllocError::CapacityExceeded`] when `new_count` exceeds the
    /// ceiling; [`AllocError::OutOfMemory`] when the system refuses.
    ///
    /// # Safety
    ///
    /// - `ptr` must have come from `allocate(old_count)` on this allocator
    /// - all `old_count` slots must hold live elements
    /// - after a successful call the old block is gone; the returned block
    ///   holds `min(old_count, new_count)` live elements followed by
    ///   uninitialized slots
    pub unsafe fn reallocate(
        &self,
        ptr: NonNull<T>,
        old_count: usize,
        new_count: usize,
    ) -> AllocResult<NonNull<T>> {
        let new_ptr = self.allocate(new_count)?;
        let keep = old_count.min(new_count);

        // SAFETY: both blocks are valid for `keep` elements and disjoint
        // (the new block was just allocated). Moved-from slots become
        // logically uninitialized; shrinking leaves live elements in the
        // tail, which are dropped before the block is released.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), keep);
            for index in keep..old_count {
                ptr::drop_in_place(ptr.as_ptr().add(index));
            }
            self.deallocate(ptr, old_count);
        }
        Ok(new_ptr)
    }
}

impl<T> Default for HeapAllocator<T> {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_LIMIT)
    }
}

impl<T> Clone for HeapAllocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HeapAllocator<T> {}

impl<T> fmt::Debug for HeapAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapAllocator")
            .field("request_limit", &self.request_limit)
            .finish()
    }
}

// SAFETY: HeapAllocator delegates to the system allocator.
// - System returns valid, aligned, exclusive blocks or null; null becomes
//   an error
// - layouts are reconstructed from T and count, matching the original
//   allocation exactly
unsafe impl<T> SlotAllocator<T> for HeapAllocator<T> {
    fn allocate(&self, count: usize) -> AllocResult<NonNull<T>> {
        if count > self.request_limit {
            return Err(AllocError::capacity_exceeded(count, self.request_limit));
        }

        let layout = self.layout_for(count)?;
        if layout.size() == 0 {
            // Zero slots, or a zero-sized element type: nothing to acquire.
            return Ok(NonNull::dangling());
        }

        trace!(count, bytes = layout.size(), "heap allocation");
        // SAFETY: layout has nonzero size, checked above.
        let raw = unsafe { System.alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or_else(|| AllocError::out_of_memory(layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        // The layout was valid at allocation time with the same count.
        let Ok(layout) = Layout::array::<T>(count) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: ptr came from System.alloc with this exact layout
        // (caller contract).
        unsafe { System.dealloc(ptr.as_ptr().cast(), layout) };
    }

    fn request_limit(&self) -> usize {
        self.request_limit
    }
}

impl<T> SlotUsage for HeapAllocator<T> {
    /// The system heap is not tracked here; nothing meaningful to report.
    fn used_slots(&self) -> usize {
        0
    }

    fn available_slots(&self) -> Option<usize> {
        None
    }
}
