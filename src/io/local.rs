use super::Storage;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::time::SystemTime;

/// Storage backed by the local filesystem.
///
/// Each open yields its own buffered file handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Create a storage that opens paths as given, relative paths against
    /// the working directory.
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    type Stream = BufReader<File>;

    fn open_read(&self, path: &Path) -> io::Result<Self::Stream> {
        let file = File::open(path)?;
        Ok(BufReader::new(file))
    }

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}
