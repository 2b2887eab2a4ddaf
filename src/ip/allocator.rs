//! Address block cursor.
//!
//! An `AddressAllocator` starts at a configured base block and hands out
//! successive, same-sized, non-overlapping blocks. The cursor only moves
//! forward; there is no wraparound.

use super::{AddressBlock, AddressError};

/// Monotonic cursor over blocks sharing one prefix length.
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    base: AddressBlock,
    cursor: AddressBlock,
    issued: u32,
}

impl AddressAllocator {
    pub fn new(base: AddressBlock) -> Self {
        AddressAllocator {
            base,
            cursor: base,
            issued: 0,
        }
    }

    /// The base this allocator was configured with.
    pub fn base(&self) -> AddressBlock {
        self.base
    }

    /// The block the next `allocate` call will return.
    pub fn current(&self) -> AddressBlock {
        self.cursor
    }

    /// How many blocks have been handed out so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }

    /// Hand out the current block and move the cursor past it.
    ///
    /// Fails without touching the cursor when the following block would not
    /// fit in the 32-bit address space.
    pub fn allocate(&mut self) -> Result<AddressBlock, AddressError> {
        let block = self.cursor;
        self.advance()?;
        self.issued += 1;
        Ok(block)
    }

    /// Move the cursor to the next network with the same mask.
    pub fn advance(&mut self) -> Result<AddressBlock, AddressError> {
        self.cursor = self.cursor.next()?;
        Ok(self.cursor)
    }
}
