//! Directory record parsing and navigation

pub mod flags;
pub mod iterator;
pub mod path_table;
pub mod record;

pub use iterator::{DirScan, ScanState};
pub use path_table::{PathTableEntry, PathTableType};
pub use record::DirectoryRecord;

use crate::error::{Iso9660Error, Result};
use crate::source::ByteSource;
use crate::utils::string;
use crate::volume::Volume;

/// Find the child of `dir` named `component`
///
/// The directory is read `batch` records at a time. An exact (case-folded)
/// name match wins; a record differing only by its version suffix is
/// remembered and returned if nothing better turns up.
pub fn find_child<S: ByteSource>(
    volume: &Volume<S>,
    dir: &DirectoryRecord,
    component: &str,
    batch: usize,
) -> Result<Option<DirectoryRecord>> {
    let mut scan = DirScan::new(dir);
    let mut fallback = None;

    loop {
        let records = match scan.next_batch(volume, batch.max(1)) {
            Ok(records) => records,
            Err(Iso9660Error::EndOfData) => return Ok(fallback),
            Err(err) => return Err(err),
        };

        for record in records {
            if record.is_dot_entry() {
                continue;
            }
            if record.name().eq_ignore_ascii_case(component) {
                return Ok(Some(record));
            }
            if fallback.is_none() && string::names_match(record.name(), component) {
                fallback = Some(record);
            }
        }
    }
}
