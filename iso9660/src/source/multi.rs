//! Split image support
//!
//! Large images are sometimes stored as several consecutive parts
//! (`disc.iso.000`, `disc.iso.001`, ...). [`MultiFile`] presents the ordered
//! parts as one contiguous byte range. Reads that start in one part and run
//! past its end continue in the next part, so callers never see a part
//! boundary.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use super::ByteSource;

/// Ordered concatenation of byte sources
pub struct MultiFile<P: ByteSource = File> {
    /// Parts, in address order
    parts: Vec<P>,
    /// Virtual start offset of each part
    starts: Vec<u64>,
    /// Combined size
    size: u64,
    /// Cursor for `Read`/`Seek`
    pos: u64,
}

impl MultiFile<File> {
    /// Open OS files and treat the ordered list as one buffer
    pub fn open<I, T>(paths: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<Path>,
    {
        Self::open_with(paths, |path| File::open(path))
    }
}

impl<P: ByteSource> MultiFile<P> {
    /// Open every path with `opener`
    ///
    /// If opening part *k* fails, parts `0..k` are closed before the error is
    /// returned.
    pub fn open_with<I, T, F>(paths: I, mut opener: F) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<Path>,
        F: FnMut(&Path) -> io::Result<P>,
    {
        let mut parts = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match opener(path) {
                Ok(part) => parts.push(part),
                Err(err) => {
                    close_all(&mut parts);
                    return Err(io::Error::new(
                        err.kind(),
                        format!("{}: {}", path.display(), err),
                    ));
                }
            }
        }

        Self::from_parts(parts)
    }

    /// Build from already opened parts
    ///
    /// Fails (after closing every part) if the size of a part cannot be
    /// queried or the combined size overflows.
    pub fn from_parts(mut parts: Vec<P>) -> io::Result<Self> {
        let sizes: io::Result<Vec<u64>> = parts.iter().map(|part| part.size()).collect();
        let sizes = match sizes {
            Ok(sizes) => sizes,
            Err(err) => {
                close_all(&mut parts);
                return Err(err);
            }
        };

        let mut starts = Vec::with_capacity(parts.len());
        let mut size = 0u64;
        for part_size in sizes {
            starts.push(size);
            size = match size.checked_add(part_size) {
                Some(size) if size <= i64::MAX as u64 => size,
                _ => {
                    close_all(&mut parts);
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "combined size of parts is too large",
                    ));
                }
            };
        }

        debug!(parts = parts.len(), size, "opened multi-part image");

        Ok(Self {
            parts,
            starts,
            size,
            pos: 0,
        })
    }

    /// Number of parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Current cursor position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Index of the part covering `offset`, `None` past the end
    ///
    /// Zero-sized parts share a start offset with their successor; the last
    /// part starting at or before `offset` is the one that holds it.
    fn part_at(&self, offset: u64) -> Option<usize> {
        if offset >= self.size {
            return None;
        }
        let idx = self.starts.partition_point(|&start| start <= offset);
        idx.checked_sub(1)
    }
}

/// Best-effort close used on construction failures
fn close_all<P: ByteSource>(parts: &mut [P]) {
    for part in parts.iter_mut() {
        if let Err(err) = part.close() {
            debug!(%err, "closing part after failed open");
        }
    }
}

impl<P: ByteSource> ByteSource for MultiFile<P> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let Some(mut idx) = self.part_at(offset) else {
            return Ok(0);
        };

        let mut local = offset - self.starts[idx];
        let mut filled = 0;
        while filled < buf.len() {
            let want = buf.len() - filled;
            let n = match self.parts[idx].read_at(&mut buf[filled..], local) {
                Ok(n) => n,
                // Hand back what earlier parts produced; the next read reports it
                Err(err) if filled > 0 => {
                    debug!(%err, part = idx, filled, "short read across parts");
                    break;
                }
                Err(err) => return Err(err),
            };
            filled += n;
            if n == want {
                break;
            }

            // Part exhausted: carry on at the start of the next one
            idx += 1;
            if idx >= self.parts.len() {
                break;
            }
            local = 0;
        }
        Ok(filled)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    /// Close every part, returning the first error
    fn close(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for part in &mut self.parts {
            if let Err(err) = part.close() {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<P: ByteSource> Read for MultiFile<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<P: ByteSource> Seek for MultiFile<P> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = seek_position(pos, self.pos, self.size).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position")
        })?;
        Ok(self.pos)
    }
}

/// Resolve a seek request, `None` when the result would be negative
pub(crate) fn seek_position(pos: SeekFrom, current: u64, end: u64) -> Option<u64> {
    let (base, delta) = match pos {
        SeekFrom::Start(abs) => return Some(abs),
        SeekFrom::Current(delta) => (current, delta),
        SeekFrom::End(delta) => (end, delta),
    };
    if delta >= 0 {
        base.checked_add(delta as u64)
    } else {
        base.checked_sub(delta.unsigned_abs())
    }
}
