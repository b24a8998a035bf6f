//! Directory Record structure
//!
//! Directory records describe files and subdirectories.
//!
//! ```text
//! BP 1      record length
//! BP 2      extended attribute record length
//! BP 3-10   extent location (both-endian 32-bit)
//! BP 11-18  data length (both-endian 32-bit)
//! BP 19-25  recording date and time
//! BP 26     file flags
//! BP 27     file unit size
//! BP 28     interleave gap size
//! BP 29-32  volume sequence number (both-endian 16-bit)
//! BP 33     file identifier length
//! BP 34-    file identifier, padding, system use
//! ```

use crate::error::{Iso9660Error, Result};
use crate::types::FileFlags;
use crate::utils::datetime::DateTime7;
use crate::utils::string;

use super::path_table::PathTableEntry;

/// Decoded directory record
///
/// Both-endian fields are read from their little-endian half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Length of directory record (BP 1)
    pub length: u8,

    /// Extended attribute record length (BP 2)
    pub extended_attr_length: u8,

    /// Extent location
    pub extent_lba: u32,

    /// Data length in bytes, 0 when unknown
    pub data_length: u32,

    /// Recording date and time
    pub recorded_at: DateTime7,

    /// File flags
    pub flags: FileFlags,

    /// File unit size (interleaved files)
    pub file_unit_size: u8,

    /// Interleave gap size
    pub interleave_gap: u8,

    /// Volume sequence number
    pub volume_sequence: u16,

    /// File identifier, "." and ".." for the special entries
    pub name: String,
}

impl DirectoryRecord {
    /// Fixed part of a record, before the identifier
    pub const HEADER_LENGTH: usize = 33;

    /// Minimum record length (fixed part plus a one-byte identifier)
    pub const MIN_LENGTH: usize = 34;

    /// Parse directory record from bytes
    ///
    /// Returns [`Iso9660Error::UnexpectedEof`] when `data` ends before the
    /// record does, so callers streaming through sectors can refill and retry.
    /// A zero length byte is not a record; callers check for it first.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(&length) = data.first() else {
            return Err(Iso9660Error::UnexpectedEof);
        };

        let record_len = length as usize;
        if record_len < Self::MIN_LENGTH {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }
        if data.len() < record_len {
            return Err(Iso9660Error::UnexpectedEof);
        }

        let name_len = data[32] as usize;
        if Self::HEADER_LENGTH + name_len > record_len {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        let mut stamp = [0u8; 7];
        stamp.copy_from_slice(&data[18..25]);

        Ok(Self {
            length,
            extended_attr_length: data[1],
            extent_lba: u32::from_le_bytes([data[2], data[3], data[4], data[5]]),
            data_length: u32::from_le_bytes([data[10], data[11], data[12], data[13]]),
            recorded_at: DateTime7::from_bytes(&stamp),
            flags: FileFlags::from_byte(data[25]),
            file_unit_size: data[26],
            interleave_gap: data[27],
            volume_sequence: u16::from_le_bytes([data[28], data[29]]),
            name: string::decode_identifier(&data[33..33 + name_len]),
        })
    }

    /// Stand-in record for a directory known only from the path table
    ///
    /// The path table carries neither the data length nor the recording time;
    /// both stay zero until the directory's own "." record is read.
    pub fn from_path_table(entry: &PathTableEntry) -> Self {
        Self {
            length: 0,
            extended_attr_length: entry.extended_attr_length,
            extent_lba: entry.extent_lba,
            data_length: 0,
            recorded_at: DateTime7::default(),
            flags: FileFlags::from_byte(FileFlags::DIRECTORY),
            file_unit_size: 0,
            interleave_gap: 0,
            volume_sequence: 1,
            name: entry.name.clone(),
        }
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// File identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data length in bytes
    pub fn size(&self) -> u64 {
        self.data_length as u64
    }

    /// "." or ".." entry
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}
