//! Synthetic ISO9660 image writer
//!
//! Produces a complete volume: descriptor set, both path tables, nested
//! directories and file extents. Images are built in 2048-byte sectors and can
//! then be laid out in any physical sector format.

use iso9660::SectorGeometry;
use std::collections::BTreeMap;

const BLOCK: usize = 2048;

/// 2016-03-01 12:00:00 at GMT+4
pub const RECORDED_AT: [u8; 7] = [116, 3, 1, 12, 0, 0, 16];

/// Which path table copies to record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTables {
    Both,
    /// Type L location left at zero
    BigOnly,
}

pub struct IsoBuilder {
    volume_id: String,
    dirs: Vec<String>,
    files: BTreeMap<String, Vec<u8>>,
    path_tables: PathTables,
    supplementary: bool,
    boot_record: bool,
}

struct DirLayout {
    path: String,
    name: String,
    parent: usize,
    lba: u32,
    size: u32,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: String::from("TEST VOLUME"),
            dirs: Vec::new(),
            files: BTreeMap::new(),
            path_tables: PathTables::Both,
            supplementary: false,
            boot_record: false,
        }
    }

    pub fn volume_id(&mut self, id: &str) -> &mut Self {
        self.volume_id = id.to_string();
        self
    }

    pub fn path_tables(&mut self, tables: PathTables) -> &mut Self {
        self.path_tables = tables;
        self
    }

    /// Add a supplementary descriptor (a copy of the primary)
    pub fn supplementary(&mut self) -> &mut Self {
        self.supplementary = true;
        self
    }

    /// Add a boot record descriptor ahead of the primary
    pub fn boot_record(&mut self) -> &mut Self {
        self.boot_record = true;
        self
    }

    /// Add a directory, `/` separated, no leading slash
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        self.dirs.push(path.trim_matches('/').to_string());
        self
    }

    /// Add a file, `/` separated, no leading slash; parents are created
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> &mut Self {
        self.files
            .insert(path.trim_matches('/').to_string(), content.to_vec());
        self
    }

    /// Build a plain 2048-byte sector image
    pub fn build(&self) -> Vec<u8> {
        let dirs = self.directory_order();
        let mut layout: Vec<DirLayout> = dirs
            .iter()
            .map(|(path, parent)| DirLayout {
                name: path.rsplit('/').next().unwrap_or("").to_string(),
                path: path.clone(),
                parent: *parent,
                lba: 0,
                size: 0,
            })
            .collect();

        // Directory sizes only depend on the record lengths.
        for i in 0..layout.len() {
            let lengths: Vec<usize> = self
                .children(&layout, i)
                .iter()
                .map(|(name, _)| record_len(name.len()))
                .collect();
            let mut blocks = 1;
            let mut used = 2 * record_len(1);
            for len in lengths {
                if used + len > BLOCK {
                    blocks += 1;
                    used = 0;
                }
                used += len;
            }
            layout[i].size = (blocks * BLOCK) as u32;
        }

        // Table size depends on the names only; the contents need the LBAs.
        let table_size = self.path_table(&layout, false).len();
        let table_blocks = table_size.div_ceil(BLOCK).max(1) as u32;

        let descriptors = 2 + self.boot_record as u32 + self.supplementary as u32;
        let l_lba = 16 + descriptors;
        let m_lba = l_lba + table_blocks;
        let mut next = m_lba + table_blocks;

        for dir in layout.iter_mut() {
            dir.lba = next;
            next += dir.size / BLOCK as u32;
        }
        let table_le = self.path_table(&layout, false);

        let mut file_lbas = BTreeMap::new();
        for (path, content) in &self.files {
            file_lbas.insert(path.clone(), next);
            next += content.len().div_ceil(BLOCK).max(1) as u32;
        }

        let total = next as usize + 1;
        let mut data = vec![0u8; total * BLOCK];

        // Descriptor set
        let mut lba = 16;
        if self.boot_record {
            let vd = &mut data[lba * BLOCK..(lba + 1) * BLOCK];
            vd[0] = 0;
            vd[1..6].copy_from_slice(b"CD001");
            vd[6] = 1;
            vd[7..30].copy_from_slice(b"EL TORITO SPECIFICATION");
            lba += 1;
        }
        let (l_loc, m_loc) = match self.path_tables {
            PathTables::Both => (l_lba, m_lba),
            PathTables::BigOnly => (0, m_lba),
        };
        let root = &layout[0];
        self.write_volume_descriptor(&mut data, lba, 1, total as u32, table_size as u32, l_loc, m_loc, root);
        lba += 1;
        if self.supplementary {
            self.write_volume_descriptor(&mut data, lba, 2, total as u32, table_size as u32, l_loc, m_loc, root);
            lba += 1;
        }
        let vd = &mut data[lba * BLOCK..(lba + 1) * BLOCK];
        vd[0] = 255;
        vd[1..6].copy_from_slice(b"CD001");
        vd[6] = 1;

        // Path tables
        let at = l_lba as usize * BLOCK;
        data[at..at + table_size].copy_from_slice(&table_le);
        let table_be = self.path_table(&layout, true);
        let at = m_lba as usize * BLOCK;
        data[at..at + table_size].copy_from_slice(&table_be);

        // Directories
        for i in 0..layout.len() {
            let dir = &layout[i];
            let parent = &layout[dir.parent];
            let mut records = vec![
                dir_record(&[0], dir.lba, dir.size, 0x02),
                dir_record(&[1], parent.lba, parent.size, 0x02),
            ];
            for (name, child) in self.children(&layout, i) {
                let (lba, size, flags) = match child {
                    Child::Dir(index) => (layout[index].lba, layout[index].size, 0x02),
                    Child::File(path) => (file_lbas[&path], self.files[&path].len() as u32, 0x00),
                };
                records.push(dir_record(name.as_bytes(), lba, size, flags));
            }

            let start = dir.lba as usize * BLOCK;
            let mut offset = 0;
            for record in records {
                if offset % BLOCK + record.len() > BLOCK {
                    offset = (offset / BLOCK + 1) * BLOCK;
                }
                data[start + offset..start + offset + record.len()].copy_from_slice(&record);
                offset += record.len();
            }
        }

        // File extents
        for (path, content) in &self.files {
            let at = file_lbas[path] as usize * BLOCK;
            data[at..at + content.len()].copy_from_slice(content);
        }

        data
    }

    /// Build and lay out in `geometry`
    pub fn build_with(&self, geometry: SectorGeometry) -> Vec<u8> {
        layout(&self.build(), geometry)
    }

    /// Directories in path table order: by depth, then parent number, then name
    fn directory_order(&self) -> Vec<(String, usize)> {
        let mut all: Vec<String> = vec![String::new()];
        let mut add_with_parents = |path: &str| {
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            for depth in 1..=parts.len() {
                let prefix = parts[..depth].join("/");
                if !all.contains(&prefix) {
                    all.push(prefix);
                }
            }
        };
        for dir in &self.dirs {
            add_with_parents(dir);
        }
        for file in self.files.keys() {
            if let Some((parent, _)) = file.rsplit_once('/') {
                add_with_parents(parent);
            }
        }

        let depth = |p: &str| if p.is_empty() { 0 } else { p.matches('/').count() + 1 };
        let max_depth = all.iter().map(|p| depth(p.as_str())).max().unwrap_or(0);

        let mut order: Vec<(String, usize)> = vec![(String::new(), 0)];
        for level in 1..=max_depth {
            let mut batch: Vec<(usize, String)> = all
                .iter()
                .filter(|p| depth(p.as_str()) == level)
                .map(|p| {
                    let parent_path = p.rsplit_once('/').map(|(a, _)| a).unwrap_or("");
                    let parent = order
                        .iter()
                        .position(|(q, _)| q == parent_path)
                        .expect("parent ordered first");
                    (parent, p.clone())
                })
                .collect();
            batch.sort();
            order.extend(batch.into_iter().map(|(parent, p)| (p, parent)));
        }
        order
    }

    fn children(&self, layout: &[DirLayout], index: usize) -> Vec<(String, Child)> {
        let dir = &layout[index].path;
        let mut children: Vec<(String, Child)> = Vec::new();

        for (i, sub) in layout.iter().enumerate() {
            if i != 0 && sub.parent == index {
                children.push((sub.name.clone(), Child::Dir(i)));
            }
        }
        for path in self.files.keys() {
            let (parent, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
            if parent == dir {
                children.push((name.to_string(), Child::File(path.clone())));
            }
        }

        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }

    fn path_table(&self, layout: &[DirLayout], big_endian: bool) -> Vec<u8> {
        let mut table = Vec::new();
        for dir in layout {
            let name: &[u8] = if dir.path.is_empty() { &[0] } else { dir.name.as_bytes() };
            table.push(name.len() as u8);
            table.push(0);
            let parent = dir.parent as u16 + 1;
            if big_endian {
                table.extend_from_slice(&dir.lba.to_be_bytes());
                table.extend_from_slice(&parent.to_be_bytes());
            } else {
                table.extend_from_slice(&dir.lba.to_le_bytes());
                table.extend_from_slice(&parent.to_le_bytes());
            }
            table.extend_from_slice(name);
            if name.len() % 2 != 0 {
                table.push(0);
            }
        }
        table
    }

    #[allow(clippy::too_many_arguments)]
    fn write_volume_descriptor(
        &self,
        data: &mut [u8],
        lba: usize,
        kind: u8,
        space: u32,
        table_size: u32,
        l_lba: u32,
        m_lba: u32,
        root: &DirLayout,
    ) {
        let vd = &mut data[lba * BLOCK..(lba + 1) * BLOCK];
        vd[0] = kind;
        vd[1..6].copy_from_slice(b"CD001");
        vd[6] = 1;
        vd[8..40].fill(b' ');
        vd[40..72].fill(b' ');
        let id = self.volume_id.as_bytes();
        vd[40..40 + id.len()].copy_from_slice(id);
        write_both_u32(&mut vd[80..88], space);
        write_both_u16(&mut vd[120..124], 1);
        write_both_u16(&mut vd[124..128], 1);
        write_both_u16(&mut vd[128..132], BLOCK as u16);
        write_both_u32(&mut vd[132..140], table_size);
        vd[140..144].copy_from_slice(&l_lba.to_le_bytes());
        vd[148..152].copy_from_slice(&m_lba.to_be_bytes());
        vd[156..190].copy_from_slice(&dir_record(&[0], root.lba, root.size, 0x02));
    }
}

enum Child {
    Dir(usize),
    File(String),
}

fn record_len(name_len: usize) -> usize {
    let len = 33 + name_len;
    len + len % 2
}

/// Encode one directory record
pub fn dir_record(name: &[u8], lba: u32, size: u32, flags: u8) -> Vec<u8> {
    let len = record_len(name.len());
    let mut rec = vec![0u8; len];
    rec[0] = len as u8;
    write_both_u32(&mut rec[2..10], lba);
    write_both_u32(&mut rec[10..18], size);
    rec[18..25].copy_from_slice(&RECORDED_AT);
    rec[25] = flags;
    write_both_u16(&mut rec[28..32], 1);
    rec[32] = name.len() as u8;
    rec[33..33 + name.len()].copy_from_slice(name);
    rec
}

fn write_both_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn write_both_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

/// Place every 2048-byte sector of `plain` where `geometry` expects it
///
/// Bytes that would land before the start of the image are dropped.
pub fn layout(plain: &[u8], geometry: SectorGeometry) -> Vec<u8> {
    let count = plain.len() / BLOCK;
    let size = geometry.sector_size as i64;
    let base = geometry.start_offset + geometry.header_skip as i64;
    let end = (count as i64 - 1) * size + base + size;

    let mut image = vec![0u8; end.max(0) as usize];
    for lba in 0..count {
        let payload = &plain[lba * BLOCK..(lba + 1) * BLOCK];
        let pos = lba as i64 * size + base;
        if pos >= 0 {
            let pos = pos as usize;
            image[pos..pos + BLOCK].copy_from_slice(payload);
        } else if ((-pos) as usize) < BLOCK {
            let cut = (-pos) as usize;
            image[..BLOCK - cut].copy_from_slice(&payload[cut..]);
        }
    }
    image
}
