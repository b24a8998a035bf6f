//! File reading and directory listing
//!
//! An [`Entry`] is an open file or directory. It shares the mounted volume
//! with the catalog that created it and carries its own read cursor and
//! directory scan position, so several entries for the same record never
//! disturb each other.

pub mod extent;
pub mod metadata;
pub mod reader;

pub use extent::Extent;
pub use metadata::Metadata;

use std::io::SeekFrom;
use std::sync::Arc;

use tracing::debug;

use crate::directory::{DirScan, DirectoryRecord};
use crate::error::{Iso9660Error, Result};
use crate::source::multi::seek_position;
use crate::source::ByteSource;
use crate::types::MAX_SECTOR_LENGTH;
use crate::volume::Volume;

/// Open file or directory
pub struct Entry<S: ByteSource> {
    volume: Arc<Volume<S>>,
    record: DirectoryRecord,
    path: String,
    position: u64,
    scan: DirScan,
}

impl<S: ByteSource> Entry<S> {
    pub(crate) fn new(volume: Arc<Volume<S>>, record: DirectoryRecord, path: String) -> Self {
        let scan = DirScan::new(&record);
        Self {
            volume,
            record,
            path,
            position: 0,
            scan,
        }
    }

    /// Name as recorded on the image
    pub fn name(&self) -> &str {
        self.record.name()
    }

    /// Absolute path the entry was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Is this a directory?
    pub fn is_dir(&self) -> bool {
        self.record.is_directory()
    }

    /// Recorded size in bytes
    pub fn len(&self) -> u64 {
        self.record.size()
    }

    /// Zero-length entry
    pub fn is_empty(&self) -> bool {
        self.record.size() == 0
    }

    /// Underlying directory record
    pub fn record(&self) -> &DirectoryRecord {
        &self.record
    }

    /// Current read cursor
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Metadata of this entry
    pub fn stat(&self) -> Metadata {
        Metadata::from(&self.record)
    }

    /// Read up to `buf.len()` bytes starting at `offset`
    ///
    /// Never reads past the recorded size. Returns
    /// [`Iso9660Error::EndOfData`] when `offset` is at or beyond it. If a
    /// sector fails after some bytes were copied, those bytes are returned.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if self.is_dir() {
            return Err(Iso9660Error::is_a_directory("read", &self.path));
        }

        let size = self.record.size();
        if offset >= size {
            return Err(Iso9660Error::EndOfData);
        }

        let want = buf.len().min((size - offset) as usize);
        if want == 0 {
            return Ok(0);
        }

        let block_size = self.volume.block_size();
        let extent = Extent::new(self.record.extent_lba, self.record.data_length);
        let mut sector = vec![0u8; MAX_SECTOR_LENGTH];
        let mut done = 0;

        while done < want {
            let (lba, within) = extent.locate(offset + done as u64, block_size);
            let n = match self.volume.read_sector(lba, &mut sector) {
                Ok(n) => n,
                Err(err) if done > 0 => {
                    debug!(lba, done, error = %err, "short read");
                    break;
                }
                Err(err) => return Err(err),
            };

            let end = n.min(block_size as usize);
            if within >= end {
                if done > 0 {
                    break;
                }
                return Err(Iso9660Error::UnexpectedEof);
            }

            let take = (end - within).min(want - done);
            buf[done..done + take].copy_from_slice(&sector[within..within + take]);
            done += take;
        }

        Ok(done)
    }

    /// Read from the cursor and advance it
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.read_at(buf, self.position)?;
        self.position += n as u64;
        Ok(n)
    }

    /// Move the read cursor
    ///
    /// Positions past the end are allowed; reading there reports
    /// [`Iso9660Error::EndOfData`]. Negative positions are rejected.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let new = seek_position(pos, self.position, self.record.size())
            .ok_or(Iso9660Error::InvalidSeek)?;
        self.position = new;
        Ok(new)
    }

    /// List up to `max` directory entries (all remaining when `max` is 0)
    ///
    /// The listing includes "." and "..". Once the directory is exhausted
    /// [`Iso9660Error::EndOfData`] is returned and the next call starts over.
    pub fn read_dir(&mut self, max: usize) -> Result<Vec<Metadata>> {
        Ok(self
            .read_dir_records(max)?
            .iter()
            .map(Metadata::from)
            .collect())
    }

    /// Like [`Entry::read_dir`], returning names only
    pub fn read_dir_names(&mut self, max: usize) -> Result<Vec<String>> {
        Ok(self
            .read_dir_records(max)?
            .into_iter()
            .map(|record| record.name)
            .collect())
    }

    /// Like [`Entry::read_dir`], returning the raw records
    pub fn read_dir_records(&mut self, max: usize) -> Result<Vec<DirectoryRecord>> {
        if !self.is_dir() {
            return Err(Iso9660Error::not_a_directory("readdir", &self.path));
        }
        self.scan.next_batch(&*self.volume, max)
    }

    /// Read the whole file into memory
    pub fn read_to_vec(&self) -> Result<Vec<u8>> {
        let size = self.record.size() as usize;
        let mut data = vec![0u8; size];
        let mut done = 0;

        while done < size {
            match self.read_at(&mut data[done..], done as u64) {
                Ok(n) => done += n,
                Err(Iso9660Error::EndOfData) => break,
                Err(err) => return Err(err),
            }
        }

        if done != size {
            return Err(Iso9660Error::UnexpectedEof);
        }
        Ok(data)
    }
}

impl<S: ByteSource> Clone for Entry<S> {
    /// Another handle on the same record, cursors copied
    fn clone(&self) -> Self {
        Self {
            volume: Arc::clone(&self.volume),
            record: self.record.clone(),
            path: self.path.clone(),
            position: self.position,
            scan: self.scan.clone(),
        }
    }
}

impl<S: ByteSource> core::fmt::Debug for Entry<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("record", &self.record)
            .field("position", &self.position)
            .finish()
    }
}
