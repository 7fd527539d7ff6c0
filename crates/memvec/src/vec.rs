//! Growable array over a pluggable slot allocator
//!
//! # Safety
//!
//! The container maintains three invariants across every operation:
//!
//! - `data` is dangling iff `capacity == 0`; otherwise it is an outstanding
//!   block of `capacity` slots from the owned allocator
//! - slots `[0, len)` hold live elements; slots `[len, capacity)` are raw
//!   memory
//! - growth acquires the replacement block *before* touching anything, so a
//!   failed grow leaves the container exactly as it was

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use tracing::trace;

use crate::allocator::{HeapAllocator, SlotAllocator};
use crate::error::AllocResult;

/// Contiguous growable array whose storage comes from a [`SlotAllocator`]
///
/// The container owns its allocator for its own lifetime and is the sole
/// manager of element lifetimes inside the storage it holds: the allocator
/// supplies raw slots, the container places and drops values in them.
///
/// Storage grows by doubling (starting at one slot), so `push` is amortized
/// O(1). Iterators borrow the container; any operation that could move the
/// storage or change the live prefix needs `&mut self` and therefore cannot
/// run while an iterator is alive. Iterator invalidation is a compile
/// error here, not a runtime hazard.
///
/// # Example
///
/// ```
/// use memvec::MemVec;
///
/// let mut names: MemVec<String> = MemVec::new();
/// names.push("pool".to_string())?;
/// names.push("heap".to_string())?;
/// assert_eq!(names.len(), 2);
/// assert_eq!(names[0], "pool");
/// # Ok::<(), memvec::AllocError>(())
/// ```
pub struct MemVec<T, A: SlotAllocator<T> = HeapAllocator<T>> {
    data: NonNull<T>,
    len: usize,
    capacity: usize,
    alloc: A,
}

impl<T, A: SlotAllocator<T> + Default> MemVec<T, A> {
    /// Creates an empty container with a default-constructed allocator
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }

    /// Creates a container with `capacity` slots pre-reserved from a
    /// default-constructed allocator
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure, e.g. when `capacity` exceeds the
    /// per-request limit.
    pub fn with_capacity(capacity: usize) -> AllocResult<Self> {
        Self::with_capacity_in(capacity, A::default())
    }
}

impl<T, A: SlotAllocator<T>> MemVec<T, A> {
    /// Creates an empty container using `alloc` for storage
    ///
    /// No memory is acquired until the first element is pushed.
    pub fn with_allocator(alloc: A) -> Self {
        MemVec {
            data: NonNull::dangling(),
            len: 0,
            capacity: 0,
            alloc,
        }
    }

    /// Creates a container with one block of `capacity` slots pre-reserved
    /// from `alloc`
    ///
    /// A workload whose final size is known up front can skip the doubling
    /// growth path entirely. This matters with a pool allocator, where
    /// each growth step would otherwise claim a fresh chunk.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; the allocator is dropped with
    /// nothing outstanding in that case.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> AllocResult<Self> {
        let mut vec = Self::with_allocator(alloc);
        if capacity > 0 {
            vec.data = vec.alloc.allocate(capacity)?;
            vec.capacity = capacity;
        }
        Ok(vec)
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no live elements are stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots currently backing the container; at least `len`
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The owned allocator
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Appends `value` at the end
    ///
    /// # Errors
    ///
    /// A growth failure is propagated untouched; the container keeps its
    /// previous length, capacity, and contents. `value` was moved into the
    /// call and is dropped on failure.
    pub fn push(&mut self, value: T) -> AllocResult<()> {
        if self.len == self.capacity {
            self.grow()?;
        }
        // SAFETY: len < capacity after grow, so slot [len] is inside our
        // block and currently raw.
        unsafe { self.data.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Drops every live element; capacity and storage are retained for reuse
    pub fn clear(&mut self) {
        let live: *mut [T] = ptr::slice_from_raw_parts_mut(self.data.as_ptr(), self.len);
        // Length goes to zero first so a panicking element Drop cannot lead
        // to a second drop of the same slots.
        self.len = 0;
        // SAFETY: the slots covered by `live` were the live prefix.
        unsafe { ptr::drop_in_place(live) };
    }

    /// Shared view of the live prefix
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) is initialized; for len == 0 a dangling pointer
        // is a valid empty-slice base.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Mutable view of the live prefix
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for as_slice, plus &mut self gives exclusivity.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// Forward iterator over the live prefix, in index order
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Mutable forward iterator over the live prefix
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Element at `index`, when live
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Doubles capacity (from zero: one slot) and moves the live prefix.
    fn grow(&mut self) -> AllocResult<()> {
        let new_capacity = if self.capacity == 0 {
            1
        } else {
            self.capacity * 2
        };
        trace!(
            len = self.len,
            from = self.capacity,
            to = new_capacity,
            "growing storage"
        );

        // Acquire first; nothing below can fail, so a refused request
        // leaves the container untouched.
        let new_data = self.alloc.allocate(new_capacity)?;

        // SAFETY: both blocks are valid for `len` elements and disjoint.
        // The bitwise copy transfers ownership of the elements: the old
        // slots become logically raw, so the old block goes back to the
        // allocator with nothing live in it.
        unsafe {
            ptr::copy_nonoverlapping(self.data.as_ptr(), new_data.as_ptr(), self.len);
            if self.capacity > 0 {
                self.alloc.deallocate(self.data, self.capacity);
            }
        }

        self.data = new_data;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T, A: SlotAllocator<T> + Default> Default for MemVec<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: SlotAllocator<T>> Drop for MemVec<T, A> {
    fn drop(&mut self) {
        self.clear();
        if self.capacity > 0 {
            // SAFETY: the block came from alloc.allocate(capacity) and
            // clear() left no live elements in it.
            unsafe { self.alloc.deallocate(self.data, self.capacity) };
        }
        // The allocator field drops after this body, releasing whatever
        // storage it still holds.
    }
}

impl<T, A: SlotAllocator<T>> Deref for MemVec<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator<T>> DerefMut for MemVec<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T, A: SlotAllocator<T>> IntoIterator for &'a MemVec<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: SlotAllocator<T>> IntoIterator for &'a mut MemVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: fmt::Debug, A: SlotAllocator<T>> fmt::Debug for MemVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// SAFETY: MemVec can move between threads when its elements and allocator
// can. It is the exclusive owner of its block; nothing aliases it.
unsafe impl<T: Send, A: SlotAllocator<T> + Send> Send for MemVec<T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::PoolAllocator;

    #[test]
    fn test_push_and_iterate() {
        let mut vec: MemVec<u32> = MemVec::new();
        for i in 0..10 {
            vec.push(i).unwrap();
        }

        assert_eq!(vec.len(), 10);
        assert!(!vec.is_empty());
        let collected: Vec<u32> = vec.iter().copied().collect();
        assert_eq!(collected, (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_growth_doubles_capacity() {
        let mut vec: MemVec<u8> = MemVec::new();
        assert_eq!(vec.capacity(), 0);

        vec.push(1).unwrap();
        assert_eq!(vec.capacity(), 1);
        vec.push(2).unwrap();
        assert_eq!(vec.capacity(), 2);
        vec.push(3).unwrap();
        assert_eq!(vec.capacity(), 4);
        vec.push(4).unwrap();
        assert_eq!(vec.capacity(), 4);
        vec.push(5).unwrap();
        assert_eq!(vec.capacity(), 8);
    }

    #[test]
    fn test_clear_retains_capacity() {
        let mut vec: MemVec<String> = MemVec::new();
        vec.push("a".to_string()).unwrap();
        vec.push("b".to_string()).unwrap();
        let capacity = vec.capacity();

        vec.clear();
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), capacity);

        vec.push("c".to_string()).unwrap();
        assert_eq!(vec.as_slice(), ["c".to_string()]);
    }

    #[test]
    fn test_slice_views() {
        let mut vec: MemVec<i32> = MemVec::new();
        for i in [3, 1, 2] {
            vec.push(i).unwrap();
        }

        assert_eq!(vec.get(1), Some(&1));
        assert_eq!(vec.get(3), None);
        assert_eq!(vec[0], 3);

        vec.as_mut_slice().sort_unstable();
        assert_eq!(&*vec, &[1, 2, 3]);
    }

    #[test]
    fn test_pool_backed_container() {
        let mut vec = MemVec::with_allocator(PoolAllocator::<u64>::with_chunk_capacity(32));
        for i in 0..20 {
            vec.push(i).unwrap();
        }
        assert_eq!(vec.iter().sum::<u64>(), 190);
    }

    #[test]
    fn test_with_capacity_skips_growth() {
        let mut vec: MemVec<u32> =
            MemVec::with_capacity_in(16, HeapAllocator::default()).unwrap();
        assert_eq!(vec.capacity(), 16);
        for i in 0..16 {
            vec.push(i).unwrap();
        }
        assert_eq!(vec.capacity(), 16);
    }

    #[test]
    fn test_debug_output() {
        let mut vec: MemVec<u8> = MemVec::new();
        vec.push(1).unwrap();
        vec.push(2).unwrap();
        assert_eq!(format!("{vec:?}"), "[1, 2]");
    }
}
