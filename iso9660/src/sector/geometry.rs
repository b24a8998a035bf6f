//! Physical sector formats
//!
//! A plain ISO stores 2048 bytes per sector. Raw captures of a disc keep the
//! whole 2352-byte frame (sync pattern and header before the payload), some
//! add 96 bytes of subchannel data per sector, and "physical image" formats
//! prepend the 150-sector lead-in pregap. The candidates below are probed in
//! order; the first one that finds the volume descriptor wins.

use core::fmt;

/// Sync pattern + header + subheader before the payload of a raw sector
pub const RAW_HEADER_SKIP: u64 = 24;

/// Byte offset of a 150-sector pregap
pub const PREGAP_OFFSET: i64 = 150 * 2048;

/// Physical layout of sectors in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorGeometry {
    /// Bytes per physical sector
    pub sector_size: usize,
    /// Byte offset of sector 0 (may be negative)
    pub start_offset: i64,
    /// Bytes to skip inside each sector before the payload
    pub header_skip: u64,
}

impl SectorGeometry {
    /// Plain 2048-byte sectors
    pub const ISO_2048: Self = Self::new(2048, 0, 0);
    /// Raw mode 2 sectors
    pub const RAW_2336: Self = Self::new(2336, 0, 0);
    /// Raw sectors
    pub const RAW_2352: Self = Self::new(2352, 0, RAW_HEADER_SKIP);
    /// Raw sectors with subchannel data
    pub const RAWQ_2448: Self = Self::new(2448, 0, RAW_HEADER_SKIP);
    /// Plain sectors behind a pregap
    pub const PREGAP_ISO_2048: Self = Self::new(2048, PREGAP_OFFSET, 0);
    /// Raw sectors behind a pregap
    pub const PREGAP_RAW_2352: Self = Self::new(2352, PREGAP_OFFSET, RAW_HEADER_SKIP);
    /// Raw subchannel sectors behind a pregap
    pub const PREGAP_RAWQ_2448: Self = Self::new(2448, PREGAP_OFFSET, RAW_HEADER_SKIP);
    /// Plain sectors shifted back 8 bytes
    pub const SHIFTED_ISO_2048: Self = Self::new(2048, -8, 0);
    /// Raw sectors shifted back 8 bytes
    pub const SHIFTED_RAW_2352: Self = Self::new(2352, -8, RAW_HEADER_SKIP);
    /// Raw subchannel sectors shifted back 8 bytes
    pub const SHIFTED_RAWQ_2448: Self = Self::new(2448, -8, RAW_HEADER_SKIP);

    /// Build a geometry
    pub const fn new(sector_size: usize, start_offset: i64, header_skip: u64) -> Self {
        Self {
            sector_size,
            start_offset,
            header_skip,
        }
    }

    /// Byte offset of the payload of sector `lba`, `None` if it falls before
    /// the start of the image
    pub fn offset_of(&self, lba: u64) -> Option<u64> {
        let base = i64::try_from(lba)
            .ok()?
            .checked_mul(self.sector_size as i64)?;
        let pos = base
            .checked_add(self.start_offset)?
            .checked_add(self.header_skip as i64)?;
        u64::try_from(pos).ok()
    }
}

impl fmt::Display for SectorGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.sector_size, self.header_skip) {
            (2048, _) => "ISO",
            (2448, _) => "RAWQ",
            _ => "RAW",
        };
        write!(f, "{} {}", kind, self.sector_size)?;
        match self.start_offset {
            0 => Ok(()),
            PREGAP_OFFSET => write!(f, " (pregap)"),
            off => write!(f, " (offset {})", off),
        }
    }
}

/// Candidate formats, in probe order
pub const SECTOR_FORMATS: [SectorGeometry; 10] = [
    SectorGeometry::ISO_2048,
    SectorGeometry::RAW_2336,
    SectorGeometry::RAW_2352,
    SectorGeometry::RAWQ_2448,
    SectorGeometry::PREGAP_ISO_2048,
    SectorGeometry::PREGAP_RAW_2352,
    SectorGeometry::PREGAP_RAWQ_2448,
    SectorGeometry::SHIFTED_ISO_2048,
    SectorGeometry::SHIFTED_RAW_2352,
    SectorGeometry::SHIFTED_RAWQ_2448,
];
