use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

use crate::error::Result;

use super::format::FormatDescriptor;

/// Widest name field of any supported variant.
pub const MAX_NAME_WIDTH: usize = 13;

/// Longest name either variant can hold once decoded.
pub const MAX_NAME_LEN: usize = 12;

/// One decoded directory record `{name, size}` before offsets are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub name: String,
    pub size: u32,
}

impl DirectoryRecord {
    /// Read one fixed-width record laid out per `descriptor`.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, descriptor: &FormatDescriptor) -> Result<Self> {
        let mut raw = [0u8; MAX_NAME_WIDTH];
        let field = &mut raw[..descriptor.name_width];
        reader.read_exact(field)?;
        let name = descriptor.decode_name(field);
        let size = reader.read_u32::<LittleEndian>()?;
        Ok(Self { name, size })
    }
}

/// A file stored in the archive, with its absolute data location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Decoded name; bytes of 0x80 and above map to U+0080..U+00FF.
    pub name: String,
    /// Payload length in bytes.
    pub size: u32,
    /// Absolute offset of the first payload byte within the archive.
    pub start_offset: u64,
}

impl Entry {
    /// Name field bytes as stored in the archive, padding removed.
    pub fn raw_name(&self) -> Vec<u8> {
        // Names are decoded one byte per char, all below U+0100.
        self.name.chars().map(|c| c as u32 as u8).collect()
    }

    /// Absolute offset one past the last payload byte.
    pub fn end_offset(&self) -> u64 {
        self.start_offset + self.size as u64
    }
}
