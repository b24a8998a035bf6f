//! Random-access byte sources
//!
//! Everything below the sector layer only needs three things from the medium:
//! positioned reads, a total size, and an explicit close. [`ByteSource`]
//! captures exactly that so the reader works the same over an OS file, an
//! in-memory buffer, a split image ([`MultiFile`]) or a firmware block device
//! ([`BlockDeviceSource`]).

pub mod block;
pub mod multi;

pub use block::BlockDeviceSource;
pub use multi::MultiFile;

use std::fs::File;
use std::io;

/// Random access to an immutable run of bytes
pub trait ByteSource {
    /// Read into `buf` starting at absolute `offset`
    ///
    /// Fills as much of `buf` as the source holds. A count smaller than
    /// `buf.len()` means the end of the source was reached, or that reading
    /// further failed and the next call reports the error. Reading at or past
    /// the end returns `Ok(0)`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Total size in bytes
    fn size(&self) -> io::Result<u64>;

    /// Flush or detach whatever the source holds
    ///
    /// OS handles (files, and the parts of a [`MultiFile`]) are only released
    /// when the source is dropped; `close` does not invalidate them.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Copy out of an in-memory buffer with end-of-source clipping
fn read_slice(data: &[u8], buf: &mut [u8], offset: u64) -> usize {
    let Ok(start) = usize::try_from(offset) else {
        return 0;
    };
    if start >= data.len() {
        return 0;
    }
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    n
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        Ok(read_slice(self, buf, offset))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl ByteSource for &[u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        Ok(read_slice(self, buf, offset))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl ByteSource for File {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match positioned_read(self, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn close(&mut self) -> io::Result<()> {
        // Read-only: nothing buffered, the descriptor is closed on drop
        Ok(())
    }
}

#[cfg(unix)]
fn positioned_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn positioned_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    FileExt::seek_read(file, buf, offset)
}
