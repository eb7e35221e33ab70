use super::Storage;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// In-memory storage holding whole archive images keyed by path.
///
/// Streams share the underlying bytes but each carries its own position.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: HashMap<PathBuf, (Arc<[u8]>, SystemTime)>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, stamped with the current time.
    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Arc<[u8]>>) {
        self.insert_with_time(path, data, SystemTime::now());
    }

    /// Add (or replace) a file with an explicit modification time.
    ///
    /// # Arguments
    /// * `path` - Key the file is opened by
    /// * `data` - Whole file contents
    /// * `modified` - Time reported for the file and any archive it holds
    pub fn insert_with_time(
        &mut self,
        path: impl Into<PathBuf>,
        data: impl Into<Arc<[u8]>>,
        modified: SystemTime,
    ) {
        self.files.insert(path.into(), (data.into(), modified));
    }

    fn get(&self, path: &Path) -> io::Result<&(Arc<[u8]>, SystemTime)> {
        self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in memory storage", path.display()),
            )
        })
    }
}

impl Storage for MemoryStorage {
    type Stream = Cursor<Arc<[u8]>>;

    fn open_read(&self, path: &Path) -> io::Result<Self::Stream> {
        let (data, _) = self.get(path)?;
        Ok(Cursor::new(Arc::clone(data)))
    }

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
        Ok(self.get(path)?.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};
    use std::time::Duration;

    #[test]
    fn test_streams_have_own_position() {
        let mut storage = MemoryStorage::new();
        storage.insert("a.grp", b"hello world".to_vec());

        let mut a = storage.open_read(Path::new("a.grp")).unwrap();
        let mut b = storage.open_read(Path::new("a.grp")).unwrap();
        a.seek(SeekFrom::Start(6)).unwrap();

        let mut buf = [0u8; 5];
        a.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"world");
        b.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn test_modified_time_is_kept() {
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let mut storage = MemoryStorage::new();
        storage.insert_with_time("x.mvl", Vec::new(), stamp);
        assert_eq!(storage.last_modified(Path::new("x.mvl")).unwrap(), stamp);
    }

    #[test]
    fn test_missing_path() {
        let storage = MemoryStorage::new();
        let err = storage.open_read(Path::new("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
