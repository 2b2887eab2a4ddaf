//! IP address allocation and management module.
//!
//! This module handles IPv4 address-block allocation for the cluster and
//! backbone tiers of a topology. Blocks come from per-base cursors and are
//! recorded in a single ledger so no two blocks of one build ever overlap.

pub mod block;
pub mod allocator;
pub mod registry;

// Re-export commonly used types
pub use block::AddressBlock;
pub use allocator::AddressAllocator;
pub use registry::AllocatorState;

/// Address allocation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address space exhausted: no block follows {0}")]
    Exhausted(AddressBlock),
    #[error("Address block {requested} overlaps already issued block {existing}")]
    Overlap {
        requested: AddressBlock,
        existing: AddressBlock,
    },
    #[error("Address block {block} has {capacity} host addresses, {requested} requested")]
    HostsExhausted {
        block: AddressBlock,
        requested: usize,
        capacity: u64,
    },
    #[error("Invalid address block: {0}")]
    Parse(String),
}
