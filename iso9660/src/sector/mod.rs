//! Sector addressing
//!
//! [`SectorSource`] turns a flat [`ByteSource`] into numbered sectors. The
//! physical layout is detected once, when the source is probed, and never
//! changes afterwards.

pub mod geometry;

pub use geometry::{SectorGeometry, SECTOR_FORMATS};

use tracing::debug;

use crate::error::{Iso9660Error, Result};
use crate::source::ByteSource;
use crate::types::{
    MAX_SECTOR_LENGTH, MIN_SECTOR_LENGTH, STANDARD_IDENTIFIER, VOLUME_DESCRIPTOR_START,
};

/// A byte source read as a run of sectors
pub struct SectorSource<S: ByteSource> {
    source: S,
    geometry: SectorGeometry,
}

impl<S: ByteSource> SectorSource<S> {
    /// Detect the sector format of `source`
    ///
    /// Each candidate in [`SECTOR_FORMATS`] is tried in order by reading
    /// sector 16 and looking for the "CD001" identifier. Candidates whose
    /// sector 16 lies past the end of the source are skipped.
    pub fn probe(source: S) -> Result<Self> {
        let size = source.size()?;
        if size < VOLUME_DESCRIPTOR_START * MIN_SECTOR_LENGTH as u64 {
            return Err(Iso9660Error::ImageTooSmall { size });
        }

        let mut image = Self::with_geometry(source, SECTOR_FORMATS[0]);
        let mut sector = [0u8; MAX_SECTOR_LENGTH];

        for geometry in SECTOR_FORMATS {
            image.geometry = geometry;
            match image.read_sector(VOLUME_DESCRIPTOR_START, &mut sector) {
                Ok(_) => {}
                Err(Iso9660Error::UnexpectedEof) => continue,
                Err(err) => return Err(err),
            }

            if &sector[1..6] == STANDARD_IDENTIFIER {
                debug!(%geometry, size, "detected sector format");
                return Ok(image);
            }
        }

        Err(Iso9660Error::InvalidSignature)
    }

    /// Use a known sector format without probing
    pub fn with_geometry(source: S, geometry: SectorGeometry) -> Self {
        Self { source, geometry }
    }

    /// Read sector `lba` into `dest`
    ///
    /// `dest` must hold at least one physical sector. Returns the number of
    /// payload bytes read, which is at least 2048.
    pub fn read_sector(&self, lba: u64, dest: &mut [u8]) -> Result<usize> {
        let size = self.geometry.sector_size;
        if dest.len() < size {
            return Err(Iso9660Error::ShortBuffer {
                needed: size,
                got: dest.len(),
            });
        }

        let pos = self
            .geometry
            .offset_of(lba)
            .ok_or(Iso9660Error::UnexpectedEof)?;

        #[cfg(feature = "trace")]
        tracing::trace!(lba, pos, "read sector");

        let n = self.source.read_at(&mut dest[..size], pos)?;
        if n < MIN_SECTOR_LENGTH {
            return Err(Iso9660Error::UnexpectedEof);
        }
        Ok(n)
    }

    /// Number of sectors, counting a trailing partial one
    pub fn sector_count(&self) -> Result<u64> {
        let size = self.source.size()?;
        Ok(size.div_ceil(self.geometry.sector_size as u64))
    }

    /// Bytes per physical sector
    pub fn sector_size(&self) -> usize {
        self.geometry.sector_size
    }

    /// Detected sector format
    pub fn geometry(&self) -> SectorGeometry {
        self.geometry
    }

    /// Underlying byte source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the byte source back
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Close the byte source
    pub fn close(&mut self) -> Result<()> {
        self.source.close()?;
        Ok(())
    }
}
