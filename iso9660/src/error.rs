//! Error types for ISO9660 operations

use std::io;

use thiserror::Error;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Error)]
pub enum Iso9660Error {
    /// I/O error from the underlying byte source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No sector format produced a "CD001" identifier at sector 16
    #[error("no ISO9660 volume descriptor found in any supported sector format")]
    InvalidSignature,

    /// Image is smaller than the 16 reserved system sectors
    #[error("image of {size} bytes is smaller than the ISO9660 system area")]
    ImageTooSmall {
        /// Image size in bytes
        size: u64,
    },

    /// Descriptor chain ended before a set terminator was found
    #[error("volume descriptor set terminator not found")]
    MissingTerminator,

    /// Terminator reached without a primary volume descriptor
    #[error("primary volume descriptor not found")]
    NoPrimaryVolume,

    /// Logical block size cannot be served by the detected sector format
    #[error("invalid block size of {block_size} bytes, sector size is {sector_size} bytes")]
    InvalidBlockSize {
        /// Block size recorded in the volume descriptor
        block_size: u32,
        /// Physical sector size of the image
        sector_size: usize,
    },

    /// Corrupted directory record
    #[error("corrupted directory record")]
    InvalidDirectoryRecord,

    /// Corrupted path table record
    #[error("corrupted path table record")]
    InvalidPathTable,

    /// File or directory not found
    #[error("{op} {path}: file does not exist")]
    NotFound {
        /// Operation that failed
        op: &'static str,
        /// Path as given by the caller
        path: String,
    },

    /// A directory was required
    #[error("{op} {path}: not a directory")]
    NotADirectory {
        /// Operation that failed
        op: &'static str,
        /// Path as given by the caller
        path: String,
    },

    /// A regular file was required
    #[error("{op} {path}: is a directory")]
    IsADirectory {
        /// Operation that failed
        op: &'static str,
        /// Path as given by the caller
        path: String,
    },

    /// Invalid path format
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// Destination buffer cannot hold one sector
    #[error("short buffer: need {needed} bytes, got {got}")]
    ShortBuffer {
        /// Bytes required
        needed: usize,
        /// Bytes supplied
        got: usize,
    },

    /// Fewer bytes were available than the format guarantees
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Clean end of a file or directory
    #[error("end of data")]
    EndOfData,

    /// Seek to a negative position
    #[error("invalid seek to a negative position")]
    InvalidSeek,
}

impl Iso9660Error {
    /// True for [`Iso9660Error::EndOfData`]
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData)
    }

    /// True for [`Iso9660Error::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Build a [`Iso9660Error::NotFound`]
    pub(crate) fn not_found(op: &'static str, path: &str) -> Self {
        Self::NotFound {
            op,
            path: path.into(),
        }
    }

    /// Build a [`Iso9660Error::NotADirectory`]
    pub(crate) fn not_a_directory(op: &'static str, path: &str) -> Self {
        Self::NotADirectory {
            op,
            path: path.into(),
        }
    }

    /// Build a [`Iso9660Error::IsADirectory`]
    pub(crate) fn is_a_directory(op: &'static str, path: &str) -> Self {
        Self::IsADirectory {
            op,
            path: path.into(),
        }
    }
}

impl From<Iso9660Error> for io::Error {
    fn from(err: Iso9660Error) -> Self {
        let kind = match err {
            Iso9660Error::Io(inner) => return inner,
            Iso9660Error::NotFound { .. } => io::ErrorKind::NotFound,
            Iso9660Error::InvalidSeek | Iso9660Error::InvalidPath(_) => {
                io::ErrorKind::InvalidInput
            }
            Iso9660Error::UnexpectedEof | Iso9660Error::EndOfData => {
                io::ErrorKind::UnexpectedEof
            }
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
