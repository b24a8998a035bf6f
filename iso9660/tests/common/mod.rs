//! Common test utilities and mock sources

#![allow(dead_code)]

pub mod builder;
pub use builder::{IsoBuilder, PathTables};

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use iso9660::ByteSource;
use std::cell::Cell;
use std::io;
use std::rc::Rc;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
    pub flushes: usize,
}

impl MemoryBlockDevice {
    /// Create a new memory block device from raw data
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_block_size(data, 2048)
    }

    /// Create a device with a different block size (e.g. 512 for a disk)
    pub fn with_block_size(data: Vec<u8>, block_size: usize) -> Self {
        Self {
            data,
            block_size,
            flushes: 0,
        }
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// In-memory source that counts `close` calls and can fail reads past an
/// offset or fail the size query
pub struct TrackedSource {
    pub data: Vec<u8>,
    pub closed: Rc<Cell<usize>>,
    pub fail_from: Option<u64>,
    pub fail_size: bool,
}

impl TrackedSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            closed: Rc::new(Cell::new(0)),
            fail_from: None,
            fail_size: false,
        }
    }

    /// Reads touching bytes at or after `offset` fail with an I/O error
    pub fn failing_from(mut self, offset: u64) -> Self {
        self.fail_from = Some(offset);
        self
    }

    /// `size` fails with an I/O error
    pub fn failing_size(mut self) -> Self {
        self.fail_size = true;
        self
    }
}

impl ByteSource for TrackedSource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if let Some(limit) = self.fail_from {
            if offset + buf.len() as u64 > limit {
                return Err(io::Error::new(io::ErrorKind::Other, "injected failure"));
            }
        }
        self.data.as_slice().read_at(buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        if self.fail_size {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied"));
        }
        Ok(self.data.len() as u64)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

/// Deterministic file content
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(31).wrapping_add(seed as u32) as u8)
        .collect()
}

/// Standard boot image used across tests
pub fn boot_image() -> IsoBuilder {
    let mut builder = IsoBuilder::new();
    builder.add_file("BOOT/VMLINUZ64.;1", &pattern(5_000, 1));
    builder.add_file("BOOT/INITRD.IMG;1", &pattern(9_000, 2));
    builder.add_file("BOOT/ISOLINUX/ISOLINUX.BIN;1", &pattern(2_048, 3));
    builder.add_file("README.TXT;1", b"hello iso9660\n");
    builder.add_file("EMPTY.DAT;1", b"");
    builder.add_dir("CDE/OPTIONAL");
    builder
}
