//! Bounded pool allocator with bump allocation inside fixed-size chunks
//!
//! The pool owns one *current* chunk of exactly `chunk_capacity` slots and
//! satisfies requests by advancing a cursor through it. A request never spans
//! chunks: when the current chunk cannot fit the request, the chunk is
//! retired and a fresh one is acquired. The unused tail of a retired chunk is
//! never reused; that slack is reported through [`PoolStats`].
//!
//! # Safety
//!
//! - Chunk storage lives behind `Box::into_raw`, so handed-out pointers stay
//!   valid across chunk turnover and until the allocator is dropped
//! - The cursor only moves forward within a chunk; disjoint requests receive
//!   disjoint slot ranges
//! - Slots are `MaybeUninit<T>`: the pool never reads, drops, or otherwise
//!   interprets element values
//! - Every chunk pointer is released exactly once, in `Drop`

use std::cell::{Cell, RefCell};
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use tracing::debug;

use super::stats::{PoolStats, PoolStatsSnapshot};
use super::traits::{SlotAllocator, SlotUsage};
use crate::error::{AllocError, AllocResult};

/// Default number of element slots per chunk
pub const DEFAULT_CHUNK_CAPACITY: usize = 64;

/// Pool allocator handing out slots of a single element type
///
/// Deallocation is accounting-only: returned slots are never recycled, and
/// the memory of every chunk is recovered wholesale when the allocator is
/// dropped. Outstanding blocks remain valid for the allocator's lifetime,
/// including blocks carved from chunks that have since been retired.
///
/// The type is `!Sync` by construction (`Cell`/`RefCell` state): sharing a
/// pool across threads is rejected at compile time.
pub struct PoolAllocator<T> {
    /// Every chunk acquired so far; the last one is current. Retired chunks
    /// are retained so outstanding blocks stay valid.
    chunks: RefCell<Vec<NonNull<[MaybeUninit<T>]>>>,
    /// First slot of the current chunk; dangling until the first chunk
    /// is acquired.
    base: Cell<NonNull<MaybeUninit<T>>>,
    /// Index of the next free slot in the current chunk.
    cursor: Cell<usize>,
    chunk_capacity: usize,
    stats: PoolStats,
}

impl<T> PoolAllocator<T> {
    /// Creates a pool with the default chunk capacity
    pub fn new() -> Self {
        Self::with_chunk_capacity(DEFAULT_CHUNK_CAPACITY)
    }

    /// Creates a pool whose chunks hold exactly `chunk_capacity` slots
    ///
    /// # Panics
    ///
    /// Panics when `chunk_capacity` is zero.
    pub fn with_chunk_capacity(chunk_capacity: usize) -> Self {
        assert!(chunk_capacity > 0, "chunk capacity must be nonzero");
        PoolAllocator {
            chunks: RefCell::new(Vec::new()),
            base: Cell::new(NonNull::dangling()),
            cursor: Cell::new(0),
            chunk_capacity,
            stats: PoolStats::new(),
        }
    }

    /// Slots per chunk, which is also the per-request limit
    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Live counters for this pool
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Immutable snapshot of the counters
    pub fn stats_snapshot(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    /// Retires the current chunk (if any) and installs a fresh one.
    fn grow_pool(&self) {
        if !self.chunks.borrow().is_empty() {
            let slack = self.chunk_capacity - self.cursor.get();
            if slack > 0 {
                self.stats.record_waste(slack);
            }
            debug!(
                slack,
                capacity = self.chunk_capacity,
                "pool chunk exhausted, acquiring a fresh one"
            );
        }

        let storage: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(self.chunk_capacity);
        // Box pointers are never null
        let chunk = NonNull::new(Box::into_raw(storage)).expect("boxed slice pointer");
        self.base.set(chunk.cast::<MaybeUninit<T>>());
        self.chunks.borrow_mut().push(chunk);
        self.cursor.set(0);
        self.stats.record_chunk_allocation();
    }
}

impl<T> Default for PoolAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: PoolAllocator implements SlotAllocator via bump allocation.
// - the cursor advances monotonically within a chunk, so successive requests
//   receive disjoint ranges
// - `index + count <= chunk_capacity` is established before any pointer is
//   produced, keeping every block inside its chunk
// - chunk storage is retained until Drop, so blocks outlive chunk turnover
unsafe impl<T> SlotAllocator<T> for PoolAllocator<T> {
    fn allocate(&self, count: usize) -> AllocResult<NonNull<T>> {
        if count > self.chunk_capacity {
            return Err(AllocError::capacity_exceeded(count, self.chunk_capacity));
        }
        if count == 0 {
            return Ok(NonNull::dangling());
        }

        let mut index = self.cursor.get();
        let fits = index
            .checked_add(count)
            .is_some_and(|end| end <= self.chunk_capacity);
        if self.chunks.borrow().is_empty() || !fits {
            self.grow_pool();
            index = 0;
        }

        // SAFETY: `base` points at the current chunk's first slot and
        // `index + count <= chunk_capacity`, so the offset stays inside the
        // chunk's allocation.
        let ptr = unsafe { self.base.get().add(index) }.cast::<T>();
        self.cursor.set(index + count);
        self.stats.record_allocation(count);
        Ok(ptr)
    }

    /// Accounting only: bump storage is never recycled. The memory behind
    /// the block is recovered together with its chunk when the allocator
    /// is dropped.
    unsafe fn deallocate(&self, _ptr: NonNull<T>, count: usize) {
        self.stats.record_deallocation(count);
    }

    fn request_limit(&self) -> usize {
        self.chunk_capacity
    }
}

impl<T> SlotUsage for PoolAllocator<T> {
    /// Slots consumed from the current chunk. Retired chunks are not
    /// counted here; see [`PoolStats`] for lifetime totals.
    fn used_slots(&self) -> usize {
        self.cursor.get()
    }

    fn available_slots(&self) -> Option<usize> {
        Some(self.chunk_capacity - self.cursor.get())
    }
}

impl<T> Drop for PoolAllocator<T> {
    fn drop(&mut self) {
        // Storage-only teardown: slots are MaybeUninit, element lifetimes
        // belong to whoever filled them.
        for chunk in self.chunks.get_mut().drain(..) {
            // SAFETY: each pointer came from Box::into_raw in grow_pool and
            // is released exactly once here.
            unsafe { drop(Box::from_raw(chunk.as_ptr())) };
        }
    }
}

// SAFETY: PoolAllocator can move between threads when T can.
// - all state is owned (chunks are reachable only through self)
// - Cell/RefCell are Send; they only forbid sharing, which Send does not
//   grant
unsafe impl<T: Send> Send for PoolAllocator<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_allocation() {
        let pool = PoolAllocator::<u32>::with_chunk_capacity(8);

        let ptr = pool.allocate(4).unwrap();
        unsafe {
            for i in 0..4 {
                ptr.as_ptr().add(i).write(i as u32 * 10);
            }
            for i in 0..4 {
                assert_eq!(*ptr.as_ptr().add(i), i as u32 * 10);
            }
        }
        assert_eq!(pool.used_slots(), 4);
        assert_eq!(pool.stats().chunks_allocated(), 1);
    }

    #[test]
    fn test_first_chunk_is_lazy() {
        let pool = PoolAllocator::<u64>::with_chunk_capacity(4);
        assert_eq!(pool.stats().chunks_allocated(), 0);
        let _ = pool.allocate(1).unwrap();
        assert_eq!(pool.stats().chunks_allocated(), 1);
    }

    #[test]
    fn test_request_at_chunk_capacity_succeeds() {
        let pool = PoolAllocator::<u8>::with_chunk_capacity(16);
        assert!(pool.allocate(16).is_ok());
    }

    #[test]
    fn test_request_over_chunk_capacity_fails() {
        let pool = PoolAllocator::<u8>::with_chunk_capacity(16);
        let err = pool.allocate(17).unwrap_err();
        assert_eq!(err, AllocError::capacity_exceeded(17, 16));
        // A failed request changes nothing.
        assert_eq!(pool.stats().chunks_allocated(), 0);
        assert_eq!(pool.used_slots(), 0);
    }

    #[test]
    fn test_rollover_retires_slack() {
        let pool = PoolAllocator::<u32>::with_chunk_capacity(8);

        let first = pool.allocate(5).unwrap();
        unsafe { first.as_ptr().write(111) };

        // 5 + 6 > 8, so this request lands in a fresh chunk.
        let second = pool.allocate(6).unwrap();
        unsafe { second.as_ptr().write(222) };

        assert_eq!(pool.stats().chunks_allocated(), 2);
        assert_eq!(pool.stats().slots_wasted(), 3);

        // Blocks in the retired chunk are still valid.
        unsafe {
            assert_eq!(*first.as_ptr(), 111);
            assert_eq!(*second.as_ptr(), 222);
        }
    }

    #[test]
    fn test_deallocate_never_recycles() {
        let pool = PoolAllocator::<u32>::with_chunk_capacity(16);

        let first = pool.allocate(4).unwrap();
        // SAFETY: no elements were placed in the block.
        unsafe { pool.deallocate(first, 4) };

        // The cursor did not move back, and the next block is distinct.
        assert_eq!(pool.used_slots(), 4);
        let second = pool.allocate(4).unwrap();
        assert_ne!(first.as_ptr(), second.as_ptr());
        assert_eq!(pool.used_slots(), 8);
        assert_eq!(pool.stats().slots_returned(), 4);
    }

    #[test]
    fn test_zero_slot_request() {
        let pool = PoolAllocator::<u64>::with_chunk_capacity(4);
        let ptr = pool.allocate(0).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        assert_eq!(pool.stats().chunks_allocated(), 0);
    }

    #[test]
    fn test_zero_sized_elements() {
        let pool = PoolAllocator::<()>::with_chunk_capacity(4);
        let ptr = pool.allocate(4).unwrap();
        unsafe { ptr.as_ptr().write(()) };
        // The ceiling is slot-denominated even for zero-sized types.
        assert!(pool.allocate(5).is_err());
    }

    #[test]
    #[should_panic(expected = "chunk capacity must be nonzero")]
    fn test_zero_chunk_capacity_panics() {
        let _ = PoolAllocator::<u8>::with_chunk_capacity(0);
    }
}
