//! File extent management
//!
//! Extents represent contiguous data regions on disk.

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32) -> Self {
        Self { lba, length }
    }

    /// Block holding byte `offset`, and the position of that byte inside it
    pub fn locate(&self, offset: u64, block_size: u32) -> (u64, usize) {
        let block_size = block_size as u64;
        (
            self.lba as u64 + offset / block_size,
            (offset % block_size) as usize,
        )
    }
}
