//! Primary / Supplementary Volume Descriptor parsing
//!
//! Both descriptor types share the layout of the fields this reader needs
//! (ECMA-119 8.4 and 8.5):
//!
//! ```text
//! BP 1      type (1 primary, 2 supplementary)
//! BP 2-6    standard identifier "CD001"
//! BP 41-72  volume identifier
//! BP 81-88  volume space size (both-endian 32-bit)
//! BP 129-132 logical block size (both-endian 16-bit)
//! BP 133-140 path table size (both-endian 32-bit)
//! BP 141-144 type L path table location (LE 32-bit)
//! BP 149-152 type M path table location (BE 32-bit)
//! BP 157-190 root directory record
//! ```

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::types::{VolumeDescriptorType, MIN_SECTOR_LENGTH};
use crate::utils::string;

use super::VolumeInfo;

const VOLUME_ID: core::ops::Range<usize> = 40..72;
const VOLUME_SPACE_SIZE: usize = 80;
const LOGICAL_BLOCK_SIZE: usize = 128;
const PATH_TABLE_SIZE: usize = 132;
const TYPE_L_PATH_TABLE: usize = 140;
const TYPE_M_PATH_TABLE: usize = 148;
const ROOT_RECORD: core::ops::Range<usize> = 156..190;

fn le32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn be32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Decode a primary or supplementary descriptor
///
/// `sector_size` is the physical sector size of the image; the logical block
/// size must be non-zero and fit inside it.
pub fn parse(data: &[u8], sector_size: usize) -> Result<VolumeInfo> {
    if data.len() < MIN_SECTOR_LENGTH {
        return Err(Iso9660Error::UnexpectedEof);
    }

    let descriptor_type = match VolumeDescriptorType::from_code(data[0]) {
        Some(kind @ (VolumeDescriptorType::Primary | VolumeDescriptorType::Supplementary)) => kind,
        _ => return Err(Iso9660Error::InvalidSignature),
    };

    let block_size = u16::from_le_bytes([data[LOGICAL_BLOCK_SIZE], data[LOGICAL_BLOCK_SIZE + 1]]);
    if block_size == 0 || block_size as usize > sector_size {
        return Err(Iso9660Error::InvalidBlockSize {
            block_size: block_size as u32,
            sector_size,
        });
    }

    let root = DirectoryRecord::parse(&data[ROOT_RECORD])?;

    Ok(VolumeInfo {
        descriptor_type,
        volume_id: string::achars_to_string(&data[VOLUME_ID]),
        volume_space_size: le32(data, VOLUME_SPACE_SIZE),
        block_size: block_size as u32,
        path_table_size: le32(data, PATH_TABLE_SIZE),
        path_table_lba: [le32(data, TYPE_L_PATH_TABLE), be32(data, TYPE_M_PATH_TABLE)],
        root,
    })
}
