//! Byte source over a `gpt_disk_io` block device
//!
//! Lets an ISO that lives on a disk (a raw device, a partition, or an image
//! attached through firmware block I/O) be read without copying it out first.
//! The device's own block size is independent of the ISO sector size; reads
//! are widened to whole device blocks and trimmed back.

use std::cell::RefCell;
use std::io;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use super::ByteSource;

/// Block I/O adapter presenting a device (or a region of it) as bytes
pub struct BlockDeviceSource<B: BlockIo> {
    /// Underlying device; `BlockIo` reads need `&mut`
    device: RefCell<B>,
    /// Device block size in bytes
    block_size: u64,
    /// First device block of the ISO (0 for a raw ISO)
    start_block: u64,
    /// Size of the exposed region in bytes
    size: u64,
}

impl<B: BlockIo> BlockDeviceSource<B> {
    /// Expose the whole device
    pub fn new(device: B) -> io::Result<Self> {
        Self::with_start(device, 0)
    }

    /// Expose the device starting at block `start_block`
    ///
    /// # Arguments
    /// * `device` - Block device containing the ISO
    /// * `start_block` - Device block where the ISO begins
    pub fn with_start(mut device: B, start_block: u64) -> io::Result<Self> {
        let block_size = u64::from(device.block_size().to_u32());
        let num_blocks = device.num_blocks().map_err(device_error)?;
        if block_size == 0 || start_block > num_blocks {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "start block {} outside device of {} blocks",
                    start_block, num_blocks
                ),
            ));
        }

        Ok(Self {
            device: RefCell::new(device),
            block_size,
            start_block,
            size: (num_blocks - start_block) * block_size,
        })
    }

    /// Give the device back
    pub fn into_inner(self) -> B {
        self.device.into_inner()
    }
}

impl<B: BlockIo> ByteSource for BlockDeviceSource<B> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.size || buf.is_empty() {
            return Ok(0);
        }

        let len = (buf.len() as u64).min(self.size - offset);
        let first = offset / self.block_size;
        let last = (offset + len - 1) / self.block_size;
        let skip = (offset % self.block_size) as usize;

        let mut scratch = vec![0u8; ((last - first + 1) * self.block_size) as usize];
        self.device
            .borrow_mut()
            .read_blocks(Lba(self.start_block + first), &mut scratch)
            .map_err(device_error)?;

        let len = len as usize;
        buf[..len].copy_from_slice(&scratch[skip..skip + len]);
        Ok(len)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    fn close(&mut self) -> io::Result<()> {
        self.device.get_mut().flush().map_err(device_error)
    }
}

fn device_error<E: core::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("block device: {}", err))
}
