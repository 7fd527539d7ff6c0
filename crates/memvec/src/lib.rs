//! Growable arrays backed by pluggable, slot-typed allocators
//!
//! This crate separates the two jobs a dynamic array usually fuses: the
//! *allocator* supplies raw, element-typed storage, and the *container*
//! manages element lifetimes inside that storage. Swap the allocator and the
//! container's behavior stays the same.
//!
//! - [`MemVec`]: a contiguous growable array, generic over its allocator
//! - [`PoolAllocator`]: bump allocation inside fixed-size chunks, freed
//!   wholesale at teardown
//! - [`HeapAllocator`]: forwards to the system heap with a per-request
//!   ceiling
//!
//! Everything here is single-threaded by contract; the pool is `!Sync` by
//! construction and owning types move between threads only when their
//! contents can.
//!
//! # Example
//!
//! ```
//! use memvec::{MemVec, PoolAllocator};
//!
//! let pool = PoolAllocator::with_chunk_capacity(16);
//! let mut values: MemVec<u32, _> = MemVec::with_allocator(pool);
//! for i in 0..10 {
//!     values.push(i)?;
//! }
//! assert_eq!(values.len(), 10);
//! assert_eq!(values.iter().sum::<u32>(), 45);
//! # Ok::<(), memvec::AllocError>(())
//! ```

#![warn(missing_docs)]

pub mod allocator;
pub mod error;
pub mod vec;

pub use allocator::{HeapAllocator, PoolAllocator, SlotAllocator, SlotUsage};
pub use error::{AllocError, AllocResult};
pub use vec::MemVec;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
