//! Error types for slot allocation operations

use thiserror::Error;

/// Result type for allocation operations
pub type AllocResult<T> = std::result::Result<T, AllocError>;

/// Errors surfaced by slot allocators
///
/// There is no partial success anywhere in the crate: an operation that
/// returns an error has left the allocator, and any container that issued
/// the request, exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// A single request asked for more slots than the allocator's fixed
    /// per-request limit
    #[error("requested {requested} slots, per-request limit is {limit}")]
    CapacityExceeded {
        /// Slots asked for by the failing request
        requested: usize,
        /// The allocator's fixed per-request ceiling, in slots
        limit: usize,
    },

    /// The byte size of the requested slot count does not form a valid layout
    #[error("size overflow computing a layout for {slots} slots")]
    SizeOverflow {
        /// Slot count whose byte size overflowed
        slots: usize,
    },

    /// The delegated system allocation returned nothing
    #[error("system allocator failed to provide {bytes} bytes")]
    OutOfMemory {
        /// Bytes that were requested from the system
        bytes: usize,
    },
}

impl AllocError {
    /// Creates a `CapacityExceeded` error
    pub fn capacity_exceeded(requested: usize, limit: usize) -> Self {
        Self::CapacityExceeded { requested, limit }
    }

    /// Creates a `SizeOverflow` error
    pub fn size_overflow(slots: usize) -> Self {
        Self::SizeOverflow { slots }
    }

    /// Creates an `OutOfMemory` error
    pub fn out_of_memory(bytes: usize) -> Self {
        Self::OutOfMemory { bytes }
    }

    /// Checks whether this is a per-request limit violation
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Checks whether this is a layout overflow
    pub fn is_size_overflow(&self) -> bool {
        matches!(self, Self::SizeOverflow { .. })
    }

    /// Checks whether the system refused the allocation
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = AllocError::capacity_exceeded(12, 10);
        let rendered = err.to_string();
        assert!(rendered.contains("12"));
        assert!(rendered.contains("10"));
    }

    #[test]
    fn test_predicates() {
        assert!(AllocError::capacity_exceeded(2, 1).is_capacity_exceeded());
        assert!(AllocError::size_overflow(usize::MAX).is_size_overflow());
        assert!(AllocError::out_of_memory(4096).is_out_of_memory());
        assert!(!AllocError::out_of_memory(4096).is_capacity_exceeded());
    }
}
