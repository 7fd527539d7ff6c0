//! Pluggable slot-typed allocators
//!
//! Two allocation policies live here, behind one capability trait:
//!
//! ## [`PoolAllocator`]
//!
//! Pre-reserves fixed-size chunks and bump-allocates within them. Use it
//! when many same-typed blocks share a lifetime: allocation is a cursor
//! bump, blocks end up adjacent in memory, and everything is freed together
//! when the pool goes out of scope. Two hard limits apply: a request may
//! never exceed one chunk, and retired chunk tails are slack that is
//! reported but never reclaimed early.
//!
//! ## [`HeapAllocator`]
//!
//! Forwards each request to the platform's default allocator, adding only a
//! fixed per-request ceiling. Use it as the drop-in default when no pooling
//! is wanted.
//!
//! Containers stay allocator-agnostic by depending only on
//! [`SlotAllocator`].

mod heap;
mod pool;
mod stats;
mod traits;

pub use heap::{DEFAULT_REQUEST_LIMIT, HeapAllocator};
pub use pool::{DEFAULT_CHUNK_CAPACITY, PoolAllocator};
pub use stats::{PoolStats, PoolStatsSnapshot};
pub use traits::{SlotAllocator, SlotUsage};
