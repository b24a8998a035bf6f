//! Copy files out of a mounted image
//!
//! The boot layout this crate is used with keeps the kernel and initial
//! ramdisk under `/BOOT`:
//!
//! ```text
//! /BOOT/VMLINUZ64.;1  -> <dest>/vmlinuz64
//! /BOOT/INITRD.IMG;1  -> <dest>/initrd.img
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::catalog::VolumeCatalog;
use crate::error::{Iso9660Error, Result};
use crate::file::Entry;
use crate::source::ByteSource;

/// Kernel image inside the volume
pub const KERNEL_PATH: &str = "/BOOT/VMLINUZ64.;1";

/// Initial ramdisk inside the volume
pub const INITRD_PATH: &str = "/BOOT/INITRD.IMG;1";

/// Host file names the boot files are written to
pub const KERNEL_FILE_NAME: &str = "vmlinuz64";
/// See [`KERNEL_FILE_NAME`]
pub const INITRD_FILE_NAME: &str = "initrd.img";

/// Host paths of extracted boot files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootFiles {
    /// Kernel image
    pub kernel: PathBuf,
    /// Initial ramdisk
    pub initrd: PathBuf,
}

/// Copy `iso_path` to the host file `dest`
///
/// Returns the number of bytes written. Fails with
/// [`Iso9660Error::UnexpectedEof`] when fewer bytes than the recorded size
/// could be read. A partially written `dest` is removed.
pub fn extract_file<S: ByteSource>(
    catalog: &VolumeCatalog<S>,
    iso_path: &str,
    dest: &Path,
) -> Result<u64> {
    let mut entry = catalog.open(iso_path)?;
    if entry.is_dir() {
        return Err(Iso9660Error::is_a_directory("extract", iso_path));
    }

    let file = File::create(dest)?;
    let written = match copy_to(&mut entry, file) {
        Ok(written) => written,
        Err(err) => {
            if let Err(rm_err) = fs::remove_file(dest) {
                warn!(path = %dest.display(), error = %rm_err, "could not remove partial file");
            }
            return Err(err);
        }
    };

    debug!(from = iso_path, to = %dest.display(), bytes = written, "extracted");
    Ok(written)
}

fn copy_to<S: ByteSource>(entry: &mut Entry<S>, file: File) -> Result<u64> {
    let mut out = BufWriter::new(file);
    let written = io::copy(entry, &mut out)?;
    out.flush()?;

    if written != entry.len() {
        return Err(Iso9660Error::UnexpectedEof);
    }
    Ok(written)
}

/// Extract the kernel and initial ramdisk into `dest_dir`
pub fn extract_boot_files<S: ByteSource>(
    catalog: &VolumeCatalog<S>,
    dest_dir: &Path,
) -> Result<BootFiles> {
    let kernel = dest_dir.join(KERNEL_FILE_NAME);
    extract_file(catalog, KERNEL_PATH, &kernel)?;

    let initrd = dest_dir.join(INITRD_FILE_NAME);
    extract_file(catalog, INITRD_PATH, &initrd)?;

    Ok(BootFiles { kernel, initrd })
}
