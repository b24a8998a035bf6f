//! Mount configuration

use crate::sector::SectorGeometry;
use crate::types::DEFAULT_READDIR_BATCH;

/// Options applied when mounting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    /// Sector format to use instead of probing
    pub geometry: Option<SectorGeometry>,
    /// Records read per batch while walking a directory during lookup
    pub readdir_batch: usize,
    /// Walk every directory at mount time to seed the lookup caches
    pub build_cache: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            geometry: None,
            readdir_batch: DEFAULT_READDIR_BATCH,
            build_cache: true,
        }
    }
}

impl MountOptions {
    /// Mount without seeding caches; every lookup walks the directories
    pub const fn lazy() -> Self {
        Self {
            geometry: None,
            readdir_batch: DEFAULT_READDIR_BATCH,
            build_cache: false,
        }
    }

    /// Force a sector format
    pub const fn with_geometry(mut self, geometry: SectorGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the lookup batch size
    pub const fn with_readdir_batch(mut self, batch: usize) -> Self {
        self.readdir_batch = batch;
        self
    }

    /// Enable or disable cache seeding
    pub const fn with_build_cache(mut self, build_cache: bool) -> Self {
        self.build_cache = build_cache;
        self
    }

    /// Batch size actually used, never zero
    pub const fn effective_batch(&self) -> usize {
        if self.readdir_batch == 0 {
            1
        } else {
            self.readdir_batch
        }
    }
}
