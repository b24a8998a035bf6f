//! `std::io` adapters for [`Entry`]
//!
//! End of data maps to `Ok(0)` as `Read` expects.

use std::io::{self, Read, Seek, SeekFrom};

use crate::error::Iso9660Error;
use crate::source::ByteSource;

use super::Entry;

impl<S: ByteSource> Read for Entry<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match Entry::read(self, buf) {
            Ok(n) => Ok(n),
            Err(Iso9660Error::EndOfData) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }
}

impl<S: ByteSource> Seek for Entry<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Entry::seek(self, pos).map_err(io::Error::from)
    }
}
