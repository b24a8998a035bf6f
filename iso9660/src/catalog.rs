//! Path lookup over a mounted volume
//!
//! The path table lists every directory but carries neither sizes nor
//! timestamps, so directories are always resolved by walking their parents.
//! Files are cached eagerly at mount time: every directory named in the path
//! table is listed once and its files are recorded under their absolute
//! uppercase path. Directories only get their path confirmed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::MountOptions;
use crate::directory::{self, path_table, DirScan, DirectoryRecord, PathTableEntry};
use crate::error::{Iso9660Error, Result};
use crate::file::{Entry, Metadata};
use crate::sector::{SectorGeometry, SectorSource};
use crate::source::ByteSource;
use crate::utils::path;
use crate::volume::{Volume, VolumeInfo};

/// Mounted ISO9660 image
pub struct VolumeCatalog<S: ByteSource> {
    volume: Arc<Volume<S>>,
    options: MountOptions,
    paths: Vec<PathTableEntry>,
    dirs: HashSet<String>,
    files: HashMap<String, DirectoryRecord>,
    cwd: String,
}

impl<S: ByteSource> VolumeCatalog<S> {
    /// Mount `source` with default options
    pub fn mount(source: S) -> Result<Self> {
        Self::mount_with(source, MountOptions::default())
    }

    /// Mount `source`
    ///
    /// Detects the sector format (unless forced), reads the volume
    /// descriptors and the path table, then seeds the lookup caches.
    pub fn mount_with(source: S, options: MountOptions) -> Result<Self> {
        let sectors = match options.geometry {
            Some(geometry) => SectorSource::with_geometry(source, geometry),
            None => SectorSource::probe(source)?,
        };
        let volume = Volume::new(sectors)?;

        let mut catalog = Self {
            volume: Arc::new(volume),
            options,
            paths: Vec::new(),
            dirs: HashSet::new(),
            files: HashMap::new(),
            cwd: String::from("/"),
        };

        catalog.build_paths();
        if options.build_cache {
            catalog.build_cache();
        }

        debug!(
            geometry = %catalog.geometry(),
            directories = catalog.paths.len(),
            files = catalog.files.len(),
            "mounted volume"
        );
        Ok(catalog)
    }

    /// Decode the path table of the primary volume
    ///
    /// A read failure stops the decode; entries decoded so far are kept.
    pub fn build_paths(&mut self) {
        let mut entries = Vec::new();
        let result = path_table::read_table(self.volume.sectors(), self.volume.info(), &mut entries);
        if let Err(err) = result {
            warn!(error = %err, decoded = entries.len(), "path table incomplete");
        }
        debug!(entries = entries.len(), "path table decoded");
        self.paths = entries;
    }

    /// List every directory named in the path table and record its children
    ///
    /// Directories that cannot be read are logged and skipped.
    pub fn build_cache(&mut self) {
        for (index, entry) in self.paths.iter().enumerate() {
            let dir_path = path_table::full_path(&self.paths, index).to_ascii_uppercase();
            self.dirs.insert(dir_path.clone());

            let mut scan = DirScan::new(&DirectoryRecord::from_path_table(entry));
            let records = match scan.next_batch(&*self.volume, 0) {
                Ok(records) => records,
                Err(Iso9660Error::EndOfData) => continue,
                Err(err) => {
                    warn!(path = %dir_path, error = %err, "skipping unreadable directory");
                    continue;
                }
            };

            for record in records {
                if record.is_dot_entry() {
                    continue;
                }
                let key = path::join(&dir_path, &record.name).to_ascii_uppercase();
                if record.is_directory() {
                    self.dirs.insert(key);
                } else {
                    self.files.insert(key, record);
                }
            }
        }

        debug!(
            dirs = self.dirs.len(),
            files = self.files.len(),
            "lookup cache built"
        );
    }

    /// Open a file or directory
    ///
    /// Relative names are resolved against the working directory. Lookups
    /// ignore case, and a name without its ";1" version suffix finds the
    /// versioned record.
    pub fn open(&self, name: &str) -> Result<Entry<S>> {
        if name.is_empty() {
            return Err(Iso9660Error::not_found("open", name));
        }

        let key = path::resolve(&self.cwd, name);
        if let Some(record) = self.files.get(&key) {
            return Ok(Entry::new(Arc::clone(&self.volume), record.clone(), key));
        }

        debug!(path = %key, "cache miss, walking directories");
        let record = self.lookup("open", name, &key)?;
        Ok(Entry::new(Arc::clone(&self.volume), record, key))
    }

    /// Change the working directory
    pub fn chdir(&mut self, name: &str) -> Result<()> {
        let key = path::resolve(&self.cwd, name);

        if self.files.contains_key(&key) {
            return Err(Iso9660Error::not_a_directory("chdir", name));
        }

        if !self.dirs.contains(&key) {
            let record = self.lookup("chdir", name, &key)?;
            if !record.is_directory() {
                return Err(Iso9660Error::not_a_directory("chdir", name));
            }
            self.dirs.insert(key.clone());
        }

        self.cwd = key;
        Ok(())
    }

    /// Whether `name` resolves to a file recorded in the lookup cache
    pub fn is_cached(&self, name: &str) -> bool {
        self.files.contains_key(&path::resolve(&self.cwd, name))
    }

    /// Current working directory
    pub fn getwd(&self) -> &str {
        &self.cwd
    }

    /// List a directory in full
    pub fn read_dir(&self, name: &str) -> Result<Vec<Metadata>> {
        let mut dir = self.open(name)?;
        match dir.read_dir(0) {
            Ok(entries) => Ok(entries),
            Err(Iso9660Error::EndOfData) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Primary volume descriptor
    pub fn volume_info(&self) -> &VolumeInfo {
        self.volume.info()
    }

    /// Supplementary volume descriptor, if present
    pub fn supplementary_info(&self) -> Option<&VolumeInfo> {
        self.volume.supplementary()
    }

    /// Detected (or forced) sector format
    pub fn geometry(&self) -> SectorGeometry {
        self.volume.geometry()
    }

    /// Decoded path table
    pub fn path_table(&self) -> &[PathTableEntry] {
        &self.paths
    }

    /// Options the volume was mounted with
    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    /// Close the underlying source
    ///
    /// If entries opened from this catalog are still alive they keep the
    /// source open; it is released when the last of them is dropped.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.volume) {
            Ok(volume) => volume.close(),
            Err(shared) => {
                warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "entries still open, deferring close"
                );
                Ok(())
            }
        }
    }

    /// Walk from the root to `key`
    fn lookup(&self, op: &'static str, name: &str, key: &str) -> Result<DirectoryRecord> {
        let batch = self.options.effective_batch();
        let mut current = self.volume.info().root.clone();

        for component in path::components(key) {
            if !current.is_directory() {
                return Err(Iso9660Error::not_a_directory(op, name));
            }
            current = directory::find_child(&*self.volume, &current, component, batch)?
                .ok_or_else(|| Iso9660Error::not_found(op, name))?;
        }

        Ok(current)
    }
}
