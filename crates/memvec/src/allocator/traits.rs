//! Capability traits for slot-typed allocators
//!
//! Allocation here is denominated in *slots* (element-sized, element-aligned
//! units of a single type `T`) rather than bytes. A container built on top
//! of a [`SlotAllocator`] asks for storage typed for its own element kind and
//! never deals in layouts itself.
//!
//! # Safety
//!
//! [`SlotAllocator`] is an unsafe trait: implementors promise that returned
//! pointers are valid, aligned, and exclusive for as long as the block is
//! outstanding. Element *lifetime* is not part of the contract: slots travel
//! as raw, uninitialized memory, and whoever placed values into them must
//! destroy those values before the block goes back.

use core::ptr::NonNull;

use crate::error::AllocResult;

/// Allocator of contiguous element slots
///
/// Every allocator carries a fixed per-request ceiling: a single request may
/// never exceed [`request_limit`](SlotAllocator::request_limit) slots, and a
/// request past the ceiling fails with
/// [`AllocError::CapacityExceeded`](crate::AllocError::CapacityExceeded)
/// rather than being split, retried, or downgraded.
///
/// # Safety
///
/// Implementors must ensure that:
/// - a successful `allocate(count)` returns a pointer valid for reads and
///   writes of `count` values of `T`, properly aligned for `T`, and disjoint
///   from every other outstanding block
/// - a block stays valid until it is passed to
///   [`deallocate`](SlotAllocator::deallocate) or the allocator is dropped,
///   whichever comes first
pub unsafe trait SlotAllocator<T> {
    /// Allocates `count` contiguous uninitialized slots.
    ///
    /// A zero-slot request succeeds with a dangling, well-aligned pointer
    /// and consumes nothing.
    ///
    /// # Errors
    ///
    /// [`AllocError::CapacityExceeded`](crate::AllocError::CapacityExceeded)
    /// when `count` exceeds the per-request limit; other variants are
    /// allocator-specific.
    fn allocate(&self, count: usize) -> AllocResult<NonNull<T>>;

    /// Returns a block of `count` slots to the allocator.
    ///
    /// Element lifetime is the caller's responsibility: any live elements in
    /// the block must have been dropped before this call. Whether the backing
    /// memory is released to the system immediately (heap) or only at
    /// allocator teardown (pool) is the implementor's policy; either way the
    /// block must not be touched afterwards.
    ///
    /// # Safety
    ///
    /// - `ptr` must have come from `allocate(count)` on this allocator, with
    ///   the same `count`
    /// - no live element may remain anywhere in the block
    /// - the block must not be accessed after this call
    unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize);

    /// The fixed per-request ceiling, in slots
    fn request_limit(&self) -> usize;
}

/// Slot-denominated usage reporting
///
/// Mirrors byte-denominated memory usage reporting, but in units of element
/// slots. Allocators that merely delegate elsewhere may have nothing useful
/// to report and return the neutral values.
pub trait SlotUsage {
    /// Slots consumed from the allocator's current working storage
    fn used_slots(&self) -> usize;

    /// Slots still available without acquiring more memory, when the
    /// allocator can know that
    fn available_slots(&self) -> Option<usize>;
}
