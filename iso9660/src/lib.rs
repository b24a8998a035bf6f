//! ISO9660 Image Reader
//!
//! A read-only ISO9660 reader for disc images, including raw CD dumps and
//! images split across several files.
//!
//! # Overview
//!
//! ISO9660 is the standard filesystem for CD-ROMs and DVDs. This crate provides:
//! - Sector format detection (plain 2048-byte ISOs, raw 2336/2352/2448-byte
//!   sectors, pregap and shifted dumps)
//! - Split images presented as one contiguous source
//! - Volume descriptor and path table parsing
//! - Path lookup, directory listing and file reading
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Source layer** - Random-access bytes: files, memory, block devices, split images
//! 2. **Sector layer** - Maps logical blocks onto the detected physical sector format
//! 3. **Volume layer** - Parses volume descriptors from sectors 16+
//! 4. **Directory layer** - Path table and directory record decoding
//! 5. **Catalog / File layer** - Lookup caches, working directory, open entries
//!
//! # Usage
//!
//! ```no_run
//! use std::io::Read;
//!
//! let catalog = iso9660::open(["tinycore.iso"])?;
//!
//! let mut kernel = catalog.open("/boot/vmlinuz64")?;
//! let mut data = Vec::new();
//! kernel.read_to_end(&mut data)?;
//! assert_eq!(data.len() as u64, kernel.len());
//!
//! for entry in catalog.read_dir("/boot")? {
//!     println!("{} {}", entry.name(), entry.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod extract;
pub mod file;
pub mod sector;
pub mod source;
pub mod types;
pub mod utils;
pub mod volume;

use std::fs::File;
use std::path::Path;

pub use catalog::VolumeCatalog;
pub use config::MountOptions;
pub use directory::{DirectoryRecord, PathTableEntry};
pub use error::{Iso9660Error, Result};
pub use extract::{extract_boot_files, extract_file, BootFiles};
pub use file::{Entry, Metadata};
pub use sector::{SectorGeometry, SectorSource, SECTOR_FORMATS};
pub use source::{BlockDeviceSource, ByteSource, MultiFile};
pub use volume::VolumeInfo;

/// Mount an image stored in one or more OS files
///
/// The files are concatenated in the order given.
pub fn open<I, T>(paths: I) -> Result<VolumeCatalog<MultiFile<File>>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<Path>,
{
    let multi = MultiFile::open(paths)?;
    VolumeCatalog::mount(multi)
}
