//! Statistics tracking for the pool allocator

use std::cell::Cell;
use std::fmt;

/// Counters maintained by [`PoolAllocator`](super::PoolAllocator)
///
/// The core is single-threaded by contract, so the counters are plain
/// `Cell`s rather than atomics.
#[derive(Debug, Default)]
pub struct PoolStats {
    slots_requested: Cell<usize>,
    slots_returned: Cell<usize>,
    slots_wasted: Cell<usize>,
    allocations: Cell<u64>,
    deallocations: Cell<u64>,
    chunks_allocated: Cell<usize>,
}

impl PoolStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Total slots handed out over the allocator's lifetime
    pub fn slots_requested(&self) -> usize {
        self.slots_requested.get()
    }

    /// Total slots returned through `deallocate`
    ///
    /// Returned slots are accounting only: the pool never recycles them.
    pub fn slots_returned(&self) -> usize {
        self.slots_returned.get()
    }

    /// Slots abandoned as unusable tail when a chunk was retired
    pub fn slots_wasted(&self) -> usize {
        self.slots_wasted.get()
    }

    /// Number of successful allocation requests
    pub fn allocations(&self) -> u64 {
        self.allocations.get()
    }

    /// Number of deallocation calls
    pub fn deallocations(&self) -> u64 {
        self.deallocations.get()
    }

    /// Chunks acquired from the heap so far
    pub fn chunks_allocated(&self) -> usize {
        self.chunks_allocated.get()
    }

    pub(crate) fn record_allocation(&self, slots: usize) {
        self.slots_requested.set(self.slots_requested.get() + slots);
        self.allocations.set(self.allocations.get() + 1);
    }

    pub(crate) fn record_deallocation(&self, slots: usize) {
        self.slots_returned.set(self.slots_returned.get() + slots);
        self.deallocations.set(self.deallocations.get() + 1);
    }

    pub(crate) fn record_chunk_allocation(&self) {
        self.chunks_allocated.set(self.chunks_allocated.get() + 1);
    }

    pub(crate) fn record_waste(&self, slots: usize) {
        self.slots_wasted.set(self.slots_wasted.get() + slots);
    }

    /// Creates an immutable snapshot of the counters
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            slots_requested: self.slots_requested(),
            slots_returned: self.slots_returned(),
            slots_wasted: self.slots_wasted(),
            allocations: self.allocations(),
            deallocations: self.deallocations(),
            chunks_allocated: self.chunks_allocated(),
        }
    }
}

/// Immutable snapshot of pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Total slots handed out
    pub slots_requested: usize,
    /// Total slots returned (never recycled)
    pub slots_returned: usize,
    /// Slots lost to retired chunk tails
    pub slots_wasted: usize,
    /// Successful allocation requests
    pub allocations: u64,
    /// Deallocation calls
    pub deallocations: u64,
    /// Chunks acquired from the heap
    pub chunks_allocated: usize,
}

impl fmt::Display for PoolStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pool statistics:")?;
        writeln!(f, "  Slots requested: {}", self.slots_requested)?;
        writeln!(f, "  Slots returned: {}", self.slots_returned)?;
        writeln!(f, "  Slots wasted: {}", self.slots_wasted)?;
        writeln!(f, "  Allocations: {}", self.allocations)?;
        writeln!(f, "  Deallocations: {}", self.deallocations)?;
        writeln!(f, "  Chunks allocated: {}", self.chunks_allocated)?;
        Ok(())
    }
}
