//! File flags parsing

use crate::types::FileFlags;

impl FileFlags {
    /// Flags byte value for a plain directory
    pub const DIRECTORY: u8 = 0x02;

    /// Parse from raw byte (BP 26)
    pub fn from_byte(byte: u8) -> Self {
        Self {
            hidden: byte & 0x01 != 0,
            directory: byte & 0x02 != 0,
            associated: byte & 0x04 != 0,
            extended_format: byte & 0x08 != 0,
            extended_permissions: byte & 0x10 != 0,
            not_final: byte & 0x80 != 0,
        }
    }
}
