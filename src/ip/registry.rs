//! Allocator state shared across one topology build.
//!
//! `AllocatorState` owns one cursor per configured base and a ledger of every
//! block handed out. It is passed by `&mut` through the assembly call chain so
//! allocation order is the call order, and no two issued blocks may overlap.

use super::{AddressAllocator, AddressBlock, AddressError};

/// Explicit allocation state for a single topology build.
#[derive(Debug, Clone, Default)]
pub struct AllocatorState {
    /// One cursor per distinct configured base, in first-use order
    allocators: Vec<AddressAllocator>,
    /// Every block issued so far, in issue order
    issued: Vec<AddressBlock>,
}

impl AllocatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next block for `base`.
    ///
    /// The first request for a base returns the base itself; later requests
    /// for the same base return the blocks after it. The issued block is
    /// checked against every block already issued from any base.
    pub fn allocate(&mut self, base: AddressBlock) -> Result<AddressBlock, AddressError> {
        let index = match self.allocators.iter().position(|a| a.base() == base) {
            Some(index) => index,
            None => {
                self.allocators.push(AddressAllocator::new(base));
                self.allocators.len() - 1
            }
        };

        let candidate = self.allocators[index].current();
        if let Some(existing) = self.issued.iter().find(|b| b.overlaps(&candidate)) {
            return Err(AddressError::Overlap {
                requested: candidate,
                existing: *existing,
            });
        }

        let block = self.allocators[index].allocate()?;
        log::debug!("Issued address block {} (base {})", block, base);
        self.issued.push(block);
        Ok(block)
    }

    /// All blocks issued so far, in issue order.
    pub fn issued(&self) -> &[AddressBlock] {
        &self.issued
    }

    pub fn is_issued(&self, block: &AddressBlock) -> bool {
        self.issued.contains(block)
    }

    /// Whether `base` already has a cursor in this state.
    pub fn has_base(&self, base: &AddressBlock) -> bool {
        self.allocators.iter().any(|a| a.base() == *base)
    }
}
