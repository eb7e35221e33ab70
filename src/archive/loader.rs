//! Directory loading.
//!
//! Both variants share the same layout:
//!
//! ```text
//! +-----------+-----------+---------------------------+-----------------+
//! | magic     | count u32 | count x {name[N], size}   | payload bytes   |
//! +-----------+-----------+---------------------------+-----------------+
//! ```
//!
//! Payloads follow the directory back to back in directory order, so each
//! entry's start offset is the payload start plus the sizes of all entries
//! before it. Offsets are assigned while the sizes are read, before any
//! sorting happens.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;
use tracing::{debug, trace};

use crate::error::{ArchiveError, Result};

use super::format::FormatDescriptor;
use super::structures::{DirectoryRecord, Entry};

/// Reads and validates the header and directory of one variant.
pub struct DirectoryLoader<'a> {
    descriptor: &'a FormatDescriptor,
}

impl<'a> DirectoryLoader<'a> {
    pub fn new(descriptor: &'a FormatDescriptor) -> Self {
        Self { descriptor }
    }

    /// Check the signature and read the entry count.
    ///
    /// The reader must be positioned at the start of the archive.
    pub fn read_header<R: Read + ?Sized>(&self, reader: &mut R) -> Result<u32> {
        let magic = self.descriptor.magic;
        let mut sig = [0u8; 16];
        let sig = &mut sig[..magic.len()];
        reader.read_exact(sig)?;
        if *sig != *magic {
            return Err(ArchiveError::UnsupportedFormat);
        }

        Ok(reader.read_u32::<LittleEndian>()?)
    }

    /// Validate the header and decode the full directory in file order.
    ///
    /// The returned entries are unsorted and carry absolute start offsets.
    pub fn load<R: Read + ?Sized>(&self, reader: &mut R) -> Result<Vec<Entry>> {
        let count = self.read_header(reader)?;

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count as usize)
            .map_err(|_| ArchiveError::OutOfMemory { count })?;

        let mut location = self.descriptor.payload_start(count);
        for _ in 0..count {
            let DirectoryRecord { name, size } = DirectoryRecord::read_from(reader, self.descriptor)?;
            trace!("Directory record {:?}: {} bytes at {}", name, size, location);
            entries.push(Entry {
                name,
                size,
                start_offset: location,
            });
            location += size as u64;
        }

        debug!(
            "Loaded {} {} directory entries ({} bytes total)",
            count, self.descriptor.info.extension, location
        );

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::format::{GRP, MVL};
    use std::io::Cursor;

    fn mvl_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = b"DMVL".to_vec();
        out.extend_from_slice(&(files.len() as u32).to_le_bytes());
        for (name, data) in files {
            let mut field = [0u8; 13];
            field[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&field);
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
        for (_, data) in files {
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn test_offsets_follow_file_order() {
        let data = mvl_bytes(&[("A.TXT", b"hello"), ("b.txt", b"abc"), ("C", b"")]);
        let entries = DirectoryLoader::new(&MVL).load(&mut Cursor::new(&data)).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "A.TXT");
        assert_eq!(entries[0].start_offset, 8 + 3 * 17);
        assert_eq!(entries[1].start_offset, 8 + 3 * 17 + 5);
        assert_eq!(entries[2].start_offset, 8 + 3 * 17 + 8);
        assert_eq!(entries[2].end_offset(), data.len() as u64);
    }

    #[test]
    fn test_signature_mismatch() {
        let mut data = mvl_bytes(&[("A.TXT", b"hello")]);
        data[0] = b'X';
        let err = DirectoryLoader::new(&MVL).load(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat));

        let err = DirectoryLoader::new(&GRP).load(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat));
    }

    #[test]
    fn test_short_count() {
        let data = b"DMVL\x02\x00".to_vec();
        let err = DirectoryLoader::new(&MVL).read_header(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_truncated_directory() {
        let data = mvl_bytes(&[("A.TXT", b"hello"), ("B.TXT", b"abc")]);
        // Cut inside the second record.
        let truncated = &data[..8 + 17 + 6];
        let err = DirectoryLoader::new(&MVL).load(&mut Cursor::new(truncated)).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_unallocatable_directory() {
        let mut data = b"DMVL".to_vec();
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = DirectoryLoader::new(&MVL).load(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, ArchiveError::OutOfMemory { count: u32::MAX }));
    }

    #[test]
    fn test_empty_archive() {
        let data = b"KenSilverman\0\0\0\0".to_vec();
        let entries = DirectoryLoader::new(&GRP).load(&mut Cursor::new(&data)).unwrap();
        assert!(entries.is_empty());
    }
}
