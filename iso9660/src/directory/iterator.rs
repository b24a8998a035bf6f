//! Directory iteration
//!
//! [`DirScan`] walks the data extent of one directory in batches. It keeps its
//! position between calls, so a directory can be listed a page at a time and
//! listed again once the end has been reported.

use crate::error::{Iso9660Error, Result};
use crate::source::ByteSource;
use crate::types::MAX_SECTOR_LENGTH;
use crate::volume::Volume;

use super::record::DirectoryRecord;

/// Scan progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// More records may follow
    Scanning,
    /// The end was reached while returning a non-empty batch; the next call
    /// reports it
    EndPending,
}

/// Resumable cursor over a directory extent
#[derive(Debug, Clone)]
pub struct DirScan {
    extent_lba: u32,
    declared_length: u32,
    state: ScanState,

    /// Extent length in bytes, 0 until known
    length: u64,
    /// Rolling lookahead; `buf[pos]` is at extent offset `offset`
    buf: Vec<u8>,
    pos: usize,
    offset: u64,
    /// Extent bytes read so far, always a whole number of blocks
    loaded: u64,
    sector: Vec<u8>,
}

impl DirScan {
    /// Cursor at the start of `dir`
    pub fn new(dir: &DirectoryRecord) -> Self {
        Self {
            extent_lba: dir.extent_lba,
            declared_length: dir.data_length,
            state: ScanState::Scanning,
            length: dir.data_length as u64,
            buf: Vec::new(),
            pos: 0,
            offset: 0,
            loaded: 0,
            sector: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Rewind to the start of the extent
    pub fn reset(&mut self) {
        self.state = ScanState::Scanning;
        self.length = self.declared_length as u64;
        self.buf.clear();
        self.pos = 0;
        self.offset = 0;
        self.loaded = 0;
    }

    /// Decode up to `max` records (all remaining when `max` is 0)
    ///
    /// Returns [`Iso9660Error::EndOfData`] once the directory is exhausted and
    /// rewinds, so the call after that starts over.
    pub fn next_batch<S: ByteSource>(
        &mut self,
        volume: &Volume<S>,
        max: usize,
    ) -> Result<Vec<DirectoryRecord>> {
        if self.state == ScanState::EndPending {
            self.reset();
            return Err(Iso9660Error::EndOfData);
        }

        let block_size = volume.block_size() as u64;
        let mut out = Vec::new();

        loop {
            if max > 0 && out.len() >= max {
                return Ok(out);
            }

            // Until the "." record says otherwise, assume a single block.
            let length = if self.length == 0 {
                block_size
            } else {
                self.length
            };
            if self.offset >= length {
                break;
            }

            if self.pos >= self.buf.len() {
                self.refill(volume, length)?;
            }

            if self.buf[self.pos] == 0 {
                let next_block = (self.offset / block_size + 1) * block_size;
                if next_block < length {
                    // Records never span blocks; the rest of this one is padding.
                    let skip = (next_block - self.offset) as usize;
                    self.pos = (self.pos + skip).min(self.buf.len());
                    self.offset = next_block;
                    continue;
                }
                break;
            }

            match DirectoryRecord::parse(&self.buf[self.pos..]) {
                Ok(record) => {
                    if self.offset == 0 && self.length == 0 && record.name() == "." {
                        self.length = record.data_length as u64;
                    }
                    self.pos += record.length as usize;
                    self.offset += record.length as u64;
                    out.push(record);
                }
                Err(Iso9660Error::UnexpectedEof) => self.refill(volume, length)?,
                Err(err) => return Err(err),
            }
        }

        if out.is_empty() {
            self.reset();
            return Err(Iso9660Error::EndOfData);
        }
        self.state = ScanState::EndPending;
        Ok(out)
    }

    /// Append the next block of the extent to the lookahead
    fn refill<S: ByteSource>(&mut self, volume: &Volume<S>, length: u64) -> Result<()> {
        let block_size = volume.block_size() as u64;
        if self.loaded >= length {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        self.buf.drain(..self.pos.min(self.buf.len()));
        self.pos = 0;

        if self.sector.is_empty() {
            self.sector = vec![0u8; MAX_SECTOR_LENGTH];
        }
        let lba = self.extent_lba as u64 + self.loaded / block_size;
        let n = volume.read_sector(lba, &mut self.sector)?;
        self.buf
            .extend_from_slice(&self.sector[..n.min(block_size as usize)]);
        self.loaded += block_size;
        Ok(())
    }
}
