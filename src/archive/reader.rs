//! Bounded read cursor over a single archive entry.

use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{ArchiveError, Result};
use crate::io::{Storage, read_full};

use super::handle::Archive;
use super::structures::Entry;

/// An open file inside an archive.
///
/// Owns a stream of its own onto the archive, so any number of readers
/// (even for the same entry) can be used side by side. Reads never cross
/// the end of the entry's payload.
pub struct EntryReader<'a, S: Storage> {
    archive: &'a Archive<S>,
    entry: &'a Entry,
    stream: S::Stream,
    /// Bytes consumed so far within the entry.
    cursor: u64,
}

impl<'a, S: Storage> EntryReader<'a, S> {
    /// Open a stream onto the archive and position it at `entry`.
    pub(crate) fn open(archive: &'a Archive<S>, entry: &'a Entry) -> Result<Self> {
        let storage = archive.storage();
        let mut stream = storage.open_read(archive.path())?;
        if let Err(e) = stream.seek(SeekFrom::Start(entry.start_offset)) {
            // Report the seek failure, not a close failure.
            let _ = storage.close(stream);
            return Err(e.into());
        }

        Ok(Self {
            archive,
            entry,
            stream,
            cursor: 0,
        })
    }

    /// Read up to `count` whole objects of `object_size` bytes into `buf`.
    ///
    /// The count is clamped so no byte past the end of the entry is read.
    /// Returns the number of whole objects read, 0 at end of entry.
    pub fn read_objects(&mut self, buf: &mut [u8], object_size: usize, count: usize) -> Result<usize> {
        if object_size == 0 || count == 0 {
            return Ok(0);
        }
        let wanted = object_size.checked_mul(count).filter(|&n| n <= buf.len()).ok_or_else(|| {
            ArchiveError::InvalidArgument(format!(
                "buffer of {} bytes cannot hold {} objects of {} bytes",
                buf.len(),
                count,
                object_size
            ))
        })?;

        let bytes_left = self.bytes_left();
        let objects = if (wanted as u64) <= bytes_left {
            count
        } else {
            (bytes_left / object_size as u64) as usize
        };
        if objects == 0 {
            return Ok(0);
        }

        let len = objects * object_size;
        let got = read_full(&mut self.stream, &mut buf[..len])?;
        let whole = got / object_size;
        let consumed = (whole * object_size) as u64;
        if consumed != got as u64 {
            // Partial trailing object: step the stream back so it stays
            // in step with the cursor.
            self.stream
                .seek(SeekFrom::Start(self.entry.start_offset + self.cursor + consumed))?;
        }
        self.cursor += consumed;

        Ok(whole)
    }

    /// Always fails: archives are read-only.
    pub fn write_objects(&mut self, _buf: &[u8], _object_size: usize, _count: usize) -> Result<usize> {
        Err(ArchiveError::NotSupported)
    }

    /// Move to `offset` bytes into the entry.
    ///
    /// Only offsets strictly below the entry size are valid; seeking to the
    /// end of the entry fails with [`ArchiveError::PastEof`].
    pub fn seek(&mut self, offset: i64) -> Result<()> {
        if offset < 0 {
            return Err(ArchiveError::InvalidArgument(format!(
                "negative seek offset {offset}"
            )));
        }
        let offset = offset as u64;
        if offset >= self.len() {
            return Err(ArchiveError::PastEof {
                offset,
                length: self.len(),
            });
        }

        self.stream
            .seek(SeekFrom::Start(self.entry.start_offset + offset))?;
        self.cursor = offset;
        Ok(())
    }

    /// Current position within the entry.
    pub fn tell(&self) -> u64 {
        self.cursor
    }

    /// True once every byte of the entry has been read.
    pub fn eof(&self) -> bool {
        self.cursor >= self.len()
    }

    /// Length of the entry; fixed for the reader's lifetime.
    pub fn len(&self) -> u64 {
        self.entry.size as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entry.size == 0
    }

    /// The entry this reader was opened on.
    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    pub fn archive(&self) -> &'a Archive<S> {
        self.archive
    }

    /// Release the underlying stream.
    pub fn close(self) -> Result<()> {
        self.archive.storage().close(self.stream)?;
        Ok(())
    }

    fn bytes_left(&self) -> u64 {
        self.len().saturating_sub(self.cursor)
    }
}

impl<S: Storage> Read for EntryReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        self.read_objects(buf, 1, len).map_err(|e| match e {
            ArchiveError::Io(e) => e,
            other => io::Error::other(other),
        })
    }
}

impl<S: Storage> std::fmt::Debug for EntryReader<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryReader")
            .field("archive", &self.archive.path())
            .field("entry", self.entry)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveFormat;
    use crate::io::MemoryStorage;
    use std::io::Cursor;
    use std::path::Path;
    use std::time::SystemTime;

    /// MVL archive holding `A.TXT` = "hello" and `b.txt` = "abc".
    fn sample() -> MemoryStorage {
        let mut data = b"DMVL".to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        for (name, size) in [("A.TXT", 5u32), ("b.txt", 3)] {
            let mut field = [0u8; 13];
            field[..name.len()].copy_from_slice(name.as_bytes());
            data.extend_from_slice(&field);
            data.extend_from_slice(&size.to_le_bytes());
        }
        data.extend_from_slice(b"helloabc");

        let mut storage = MemoryStorage::new();
        storage.insert("movies.mvl", data);
        storage
    }

    #[test]
    fn test_read_clamps_to_entry() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut reader = archive.open_read("a.txt").unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(reader.read_objects(&mut buf, 1, 64).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(reader.tell(), 5);
        assert!(reader.eof());
        assert_eq!(reader.read_objects(&mut buf, 1, 64).unwrap(), 0);
        reader.close().unwrap();
    }

    #[test]
    fn test_read_whole_objects_only() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut reader = archive.open_read("A.TXT").unwrap();

        let mut buf = [0u8; 8];
        // Five bytes hold two 2-byte objects.
        assert_eq!(reader.read_objects(&mut buf, 2, 4).unwrap(), 2);
        assert_eq!(&buf[..4], b"hell");
        assert_eq!(reader.tell(), 4);
        assert_eq!(reader.read_objects(&mut buf, 2, 1).unwrap(), 0);
        assert!(!reader.eof());
        assert_eq!(reader.read_objects(&mut buf, 1, 1).unwrap(), 1);
        assert_eq!(buf[0], b'o');
        assert!(reader.eof());
    }

    #[test]
    fn test_read_rejects_small_buffer() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut reader = archive.open_read("A.TXT").unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(
            reader.read_objects(&mut buf, 2, 2),
            Err(ArchiveError::InvalidArgument(_))
        ));
        assert_eq!(reader.read_objects(&mut buf, 0, 2).unwrap(), 0);
    }

    #[test]
    fn test_seek_bounds() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut reader = archive.open_read("b.txt").unwrap();
        assert_eq!(reader.len(), 3);

        assert!(matches!(reader.seek(3), Err(ArchiveError::PastEof { offset: 3, length: 3 })));
        assert!(matches!(reader.seek(-1), Err(ArchiveError::InvalidArgument(_))));
        assert_eq!(reader.tell(), 0);

        reader.seek(2).unwrap();
        assert_eq!(reader.tell(), 2);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read_objects(&mut buf, 1, 4).unwrap(), 1);
        assert_eq!(buf[0], b'c');

        reader.seek(0).unwrap();
        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        assert_eq!(all, b"abc");
    }

    #[test]
    fn test_readers_are_independent() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut a = archive.open_read("A.TXT").unwrap();
        let mut b = archive.open_read("A.TXT").unwrap();

        let mut buf = [0u8; 2];
        a.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"he");
        b.seek(3).unwrap();
        b.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"lo");
        a.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ll");
    }

    #[test]
    fn test_write_rejected() {
        let storage = sample();
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        let mut reader = archive.open_read("A.TXT").unwrap();
        assert!(matches!(
            reader.write_objects(b"x", 1, 1),
            Err(ArchiveError::NotSupported)
        ));
        assert_eq!(reader.entry().name, "A.TXT");
        assert_eq!(reader.archive().len(), 2);
    }

    /// Storage whose streams cannot seek and whose close always fails.
    struct Broken(Vec<u8>);

    struct NoSeek(Cursor<Vec<u8>>);

    impl Read for NoSeek {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Seek for NoSeek {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::other("seek unsupported"))
        }
    }

    impl Storage for Broken {
        type Stream = NoSeek;

        fn open_read(&self, _path: &Path) -> io::Result<Self::Stream> {
            Ok(NoSeek(Cursor::new(self.0.clone())))
        }

        fn last_modified(&self, _path: &Path) -> io::Result<SystemTime> {
            Ok(SystemTime::UNIX_EPOCH)
        }

        fn close(&self, _stream: Self::Stream) -> io::Result<()> {
            Err(io::Error::other("close failed"))
        }
    }

    #[test]
    fn test_failing_stream() {
        let mut data = b"DMVL".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(b"A.TXT\0\0\0\0\0\0\0\0");
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(b'!');

        // A failing close after a good load still aborts the open.
        let storage = Broken(data);
        assert!(matches!(
            Archive::open_with(&storage, "x.mvl", ArchiveFormat::Mvl),
            Err(ArchiveError::Io(_))
        ));
    }

    #[test]
    fn test_open_seek_failure() {
        struct SeekFails(MemoryStorage);

        impl Storage for SeekFails {
            type Stream = NoSeek;

            fn open_read(&self, path: &Path) -> io::Result<Self::Stream> {
                let mut data = Vec::new();
                self.0.open_read(path)?.read_to_end(&mut data)?;
                Ok(NoSeek(Cursor::new(data)))
            }

            fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
                self.0.last_modified(path)
            }
        }

        let storage = SeekFails(sample());
        let archive = Archive::open_with(&storage, "movies.mvl", ArchiveFormat::Mvl).unwrap();
        assert!(archive.exists("A.TXT"));
        assert!(matches!(archive.open_read("A.TXT"), Err(ArchiveError::Io(_))));
    }
}
