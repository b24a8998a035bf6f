//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Multiple descriptors may be present (Primary, Supplementary, Boot Record);
//! the set ends with a terminator.

pub mod primary;

use tracing::debug;

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::sector::{SectorGeometry, SectorSource};
use crate::source::ByteSource;
use crate::types::{
    VolumeDescriptorType, MAX_SECTOR_LENGTH, STANDARD_IDENTIFIER, VOLUME_DESCRIPTOR_START,
};

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// Read the header from the start of a descriptor sector
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 7 {
            return Err(Iso9660Error::UnexpectedEof);
        }

        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(&data[1..6]);

        Ok(Self {
            type_code: data[0],
            identifier,
            version: data[6],
        })
    }

    /// Check the "CD001" identifier
    pub fn validate(&self) -> bool {
        &self.identifier == STANDARD_IDENTIFIER
    }

    /// Known descriptor type, if any
    pub fn descriptor_type(&self) -> Option<VolumeDescriptorType> {
        VolumeDescriptorType::from_code(self.type_code)
    }
}

/// Parsed primary or supplementary volume descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Primary or Supplementary
    pub descriptor_type: VolumeDescriptorType,

    /// Volume identifier, trailing spaces removed
    pub volume_id: String,

    /// Volume size in logical blocks
    pub volume_space_size: u32,

    /// Logical block size in bytes
    pub block_size: u32,

    /// Path table size in bytes
    pub path_table_size: u32,

    /// Path table locations: Type L (little-endian) and Type M (big-endian)
    pub path_table_lba: [u32; 2],

    /// Root directory record
    pub root: DirectoryRecord,
}

/// Walk the descriptor set starting at sector 16
///
/// Returns the primary descriptor and, if present, the first supplementary
/// one. Boot records and unknown types are skipped.
pub fn find_volumes<S: ByteSource>(
    sectors: &SectorSource<S>,
) -> Result<(VolumeInfo, Option<VolumeInfo>)> {
    let mut buffer = vec![0u8; MAX_SECTOR_LENGTH];
    let mut primary: Option<VolumeInfo> = None;
    let mut supplementary: Option<VolumeInfo> = None;

    let mut lba = VOLUME_DESCRIPTOR_START;
    loop {
        let n = match sectors.read_sector(lba, &mut buffer) {
            Ok(n) => n,
            Err(Iso9660Error::UnexpectedEof) => return Err(Iso9660Error::MissingTerminator),
            Err(err) => return Err(err),
        };
        let data = &buffer[..n];

        let header = VolumeDescriptorHeader::parse(data)?;
        if !header.validate() {
            return Err(Iso9660Error::InvalidSignature);
        }

        match header.descriptor_type() {
            Some(VolumeDescriptorType::Terminator) => break,
            Some(VolumeDescriptorType::Primary) if primary.is_none() => {
                let info = primary::parse(data, sectors.sector_size())?;
                debug!(lba, volume_id = %info.volume_id, block_size = info.block_size, "primary volume descriptor");
                primary = Some(info);
            }
            Some(VolumeDescriptorType::Supplementary) if supplementary.is_none() => {
                let info = primary::parse(data, sectors.sector_size())?;
                debug!(lba, volume_id = %info.volume_id, "supplementary volume descriptor");
                supplementary = Some(info);
            }
            _ => debug!(lba, type_code = header.type_code, "skipping volume descriptor"),
        }

        lba += 1;
    }

    let primary = primary.ok_or(Iso9660Error::NoPrimaryVolume)?;
    Ok((primary, supplementary))
}

/// Immutable state of a mounted volume
///
/// Shared between the catalog and every open entry.
pub struct Volume<S: ByteSource> {
    sectors: SectorSource<S>,
    primary: VolumeInfo,
    supplementary: Option<VolumeInfo>,
}

impl<S: ByteSource> Volume<S> {
    /// Read the descriptor set of an already probed source
    pub fn new(sectors: SectorSource<S>) -> Result<Self> {
        let (primary, supplementary) = find_volumes(&sectors)?;
        Ok(Self {
            sectors,
            primary,
            supplementary,
        })
    }

    /// Primary volume descriptor
    pub fn info(&self) -> &VolumeInfo {
        &self.primary
    }

    /// Supplementary volume descriptor
    pub fn supplementary(&self) -> Option<&VolumeInfo> {
        self.supplementary.as_ref()
    }

    /// Logical block size of the primary volume
    pub fn block_size(&self) -> u32 {
        self.primary.block_size
    }

    /// Physical sector format
    pub fn geometry(&self) -> SectorGeometry {
        self.sectors.geometry()
    }

    /// Sector reader
    pub fn sectors(&self) -> &SectorSource<S> {
        &self.sectors
    }

    /// Read sector `lba` into `dest`
    pub fn read_sector(&self, lba: u64, dest: &mut [u8]) -> Result<usize> {
        self.sectors.read_sector(lba, dest)
    }

    /// Close the byte source
    pub fn close(mut self) -> Result<()> {
        self.sectors.close()
    }
}
