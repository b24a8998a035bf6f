//! Path Table parsing
//!
//! The path table is a flat list of every directory on the volume, parents
//! referenced by 1-based index. It is stored twice, once per byte order.

use tracing::debug;

use crate::error::{Iso9660Error, Result};
use crate::sector::SectorSource;
use crate::source::ByteSource;
use crate::types::MAX_SECTOR_LENGTH;
use crate::utils::string;
use crate::volume::VolumeInfo;

/// Path table type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTableType {
    /// Little-endian (Type L)
    LittleEndian,
    /// Big-endian (Type M)
    BigEndian,
}

impl PathTableType {
    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => u32::from_le_bytes(bytes),
            Self::BigEndian => u32::from_be_bytes(bytes),
        }
    }

    fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(bytes),
            Self::BigEndian => u16::from_be_bytes(bytes),
        }
    }
}

/// Decoded path table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableEntry {
    /// Directory identifier ("." for the root)
    pub name: String,

    /// Extended attribute record length
    pub extended_attr_length: u8,

    /// Extent location of the directory
    pub extent_lba: u32,

    /// Parent directory number (1-based; the root is its own parent)
    pub parent: u16,

    /// Bytes the record occupies in the table, padding included
    pub record_length: usize,
}

impl PathTableEntry {
    /// Fixed part of a record, before the identifier
    pub const HEADER_LENGTH: usize = 8;

    /// Parse one record
    ///
    /// Returns [`Iso9660Error::UnexpectedEof`] when `data` ends before the
    /// record does and [`Iso9660Error::InvalidPathTable`] for an empty
    /// identifier.
    pub fn parse(order: PathTableType, data: &[u8]) -> Result<Self> {
        let Some(&name_len) = data.first() else {
            return Err(Iso9660Error::UnexpectedEof);
        };

        if name_len == 0 {
            return Err(Iso9660Error::InvalidPathTable);
        }

        let name_len = name_len as usize;
        let record_length = Self::HEADER_LENGTH + name_len + (name_len & 1);
        if data.len() < record_length {
            return Err(Iso9660Error::UnexpectedEof);
        }

        Ok(Self {
            name: string::decode_identifier(&data[8..8 + name_len]),
            extended_attr_length: data[1],
            extent_lba: order.u32([data[2], data[3], data[4], data[5]]),
            parent: order.u16([data[6], data[7]]),
            record_length,
        })
    }
}

/// Decode the path table of `info`, appending records to `out`
///
/// Starts at the Type L copy, or at the Type M copy when the Type L location
/// is zero. Records that straddle a sector boundary are stitched together by
/// moving the unconsumed tail to the front of the buffer and appending the
/// next sector. On error, `out` keeps every record decoded so far.
pub fn read_table<S: ByteSource>(
    sectors: &SectorSource<S>,
    info: &VolumeInfo,
    out: &mut Vec<PathTableEntry>,
) -> Result<()> {
    let (mut lba, order) = match info.path_table_lba {
        [0, be] => (be as u64, PathTableType::BigEndian),
        [le, _] => (le as u64, PathTableType::LittleEndian),
    };
    if lba == 0 {
        return Ok(());
    }

    debug!(lba, ?order, size = info.path_table_size, "reading path table");

    let block_size = info.block_size as usize;
    let total = info.path_table_size as usize;
    let mut sector = vec![0u8; MAX_SECTOR_LENGTH];
    let mut buf: Vec<u8> = Vec::with_capacity(2 * MAX_SECTOR_LENGTH);
    let mut pos = 0;
    let mut consumed = 0;

    while consumed < total {
        match PathTableEntry::parse(order, &buf[pos..]) {
            Ok(entry) => {
                pos += entry.record_length;
                consumed += entry.record_length;
                out.push(entry);
            }
            Err(Iso9660Error::UnexpectedEof) => {
                buf.drain(..pos);
                pos = 0;

                let n = sectors.read_sector(lba, &mut sector)?;
                buf.extend_from_slice(&sector[..n.min(block_size)]);
                lba += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Absolute path of entry `index` (0-based), built by walking parent links
///
/// Components are returned as recorded; malformed parent links (pointing
/// forward or at themselves) end the walk.
pub fn full_path(entries: &[PathTableEntry], index: usize) -> String {
    let mut names = Vec::new();
    let mut idx = index;

    while idx > 0 && idx < entries.len() {
        names.push(entries[idx].name.as_str());
        let parent = entries[idx].parent as usize;
        if parent == 0 || parent - 1 >= idx {
            break;
        }
        idx = parent - 1;
    }

    names.reverse();
    format!("/{}", names.join("/"))
}
