//! File metadata extraction

use std::time::SystemTime;

use chrono::{DateTime, FixedOffset};

use crate::directory::record::DirectoryRecord;
use crate::types::FileFlags;
use crate::utils::datetime::DateTime7;
use crate::utils::string;

/// Snapshot of a directory record, as returned by `stat` and directory listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    size: u64,
    extent_lba: u32,
    flags: FileFlags,
    recorded_at: DateTime7,
}

impl Metadata {
    /// Get file name as recorded, version suffix included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without the ";1" version suffix and trailing dot
    pub fn base_name(&self) -> &str {
        string::strip_version(&self.name)
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        let base = self.base_name();
        base.rfind('.').map(|dot| &base[dot + 1..])
    }

    /// Size in bytes
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Zero-length file
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// First block of the data extent
    pub fn extent_lba(&self) -> u32 {
        self.extent_lba
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }

    /// Is this a directory?
    pub fn is_dir(&self) -> bool {
        self.flags.directory
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// Raw file flags
    pub fn flags(&self) -> FileFlags {
        self.flags
    }

    /// Recording timestamp as stored
    pub fn recorded_at(&self) -> DateTime7 {
        self.recorded_at
    }

    /// Recording time with its GMT offset, `None` when unset
    pub fn recorded_time(&self) -> Option<DateTime<FixedOffset>> {
        self.recorded_at.to_datetime()
    }

    /// Recording time, `UNIX_EPOCH` when the record carries none
    pub fn modified(&self) -> SystemTime {
        self.recorded_at.to_system_time()
    }
}

impl From<&DirectoryRecord> for Metadata {
    fn from(record: &DirectoryRecord) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size(),
            extent_lba: record.extent_lba,
            flags: record.flags,
            recorded_at: record.recorded_at,
        }
    }
}
