use std::path::{Path, PathBuf};
use std::slice;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::io::{LocalStorage, Storage};

use super::format::ArchiveFormat;
use super::index::LookupIndex;
use super::loader::DirectoryLoader;
use super::reader::EntryReader;
use super::structures::Entry;

/// A loaded, read-only archive.
///
/// The directory is decoded and sorted once at open time and never changes
/// afterwards, so an `Archive` can be shared between threads freely. Every
/// [`EntryReader`] opened from it carries its own stream.
pub struct Archive<S: Storage = LocalStorage> {
    storage: S,
    path: PathBuf,
    format: ArchiveFormat,
    /// Modification time of the archive file, captured at open.
    modified: SystemTime,
    index: LookupIndex,
}

impl Archive<LocalStorage> {
    /// Open an archive of a known format from the local filesystem.
    pub fn open(path: impl AsRef<Path>, format: ArchiveFormat) -> Result<Self> {
        Self::open_with(LocalStorage::new(), path, format)
    }

    /// Open an archive from the local filesystem, detecting its format.
    pub fn open_detect(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_detect_with(LocalStorage::new(), path)
    }
}

impl<S: Storage> Archive<S> {
    /// Open an archive of a known format from `storage`.
    ///
    /// Either the whole directory loads or nothing is returned.
    ///
    /// # Arguments
    ///
    /// * `storage` - Backend used for this open and for every later reader
    /// * `path` - Location of the archive within `storage`
    /// * `format` - Variant whose layout and naming rules apply
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsupportedFormat`] on a signature mismatch,
    /// [`ArchiveError::OutOfMemory`] if the directory cannot be allocated and
    /// [`ArchiveError::Io`] for short reads or stream failures.
    pub fn open_with(storage: S, path: impl AsRef<Path>, format: ArchiveFormat) -> Result<Self> {
        let path = path.as_ref();
        let descriptor = format.descriptor();
        let modified = storage.last_modified(path)?;

        debug!("Opening {} archive: {:?}", format, path);

        // Decode the directory, then release the stream whatever the outcome
        let mut stream = storage.open_read(path)?;
        let loaded = DirectoryLoader::new(descriptor).load(&mut stream);
        let closed = storage.close(stream);
        let entries = loaded?;
        closed?;

        let index = LookupIndex::build(entries, descriptor.ordering);

        Ok(Self {
            storage,
            path: path.to_path_buf(),
            format,
            modified,
            index,
        })
    }

    /// Open an archive from `storage`, trying each supported format.
    pub fn open_detect_with(storage: S, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ArchiveFormat::detect(&storage, path)?;
        Self::open_with(storage, path, format)
    }

    /// Always fails: neither format can be written.
    pub fn open_for_writing(_storage: S, _path: impl AsRef<Path>, _format: ArchiveFormat) -> Result<Self> {
        Err(ArchiveError::NotSupported)
    }

    /// List the names in `dirname`, in index order.
    ///
    /// Only the root (`""` or `"/"`) is a directory.
    pub fn enumerate(&self, dirname: &str) -> Result<Names<'_>> {
        if !is_root(dirname) {
            return Err(ArchiveError::NotADirectory(dirname.to_string()));
        }
        Ok(Names {
            inner: self.index.entries().iter(),
        })
    }

    /// Whether `name` resolves to an entry.
    pub fn exists(&self, name: &str) -> bool {
        self.index.lookup(name).is_ok()
    }

    /// Always `false` for an existing name; archives hold no directories.
    pub fn is_directory(&self, name: &str) -> Result<bool> {
        self.index.lookup(name).map(|_| false)
    }

    /// Always `false` for an existing name; archives hold no links.
    pub fn is_symlink(&self, name: &str) -> Result<bool> {
        self.index.lookup(name).map(|_| false)
    }

    /// Modification time of `name`, which is that of the archive itself.
    pub fn last_modified(&self, name: &str) -> Result<SystemTime> {
        self.index.lookup(name).map(|_| self.modified)
    }

    /// Look up the entry for `name`.
    pub fn entry(&self, name: &str) -> Result<&Entry> {
        self.index.lookup(name)
    }

    /// Open `name` for reading.
    ///
    /// # Arguments
    ///
    /// * `name` - File name, matched with the format's case rules
    ///
    /// # Returns
    ///
    /// A reader with its own stream, positioned at the start of the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotFound`] when no entry matches, or
    /// [`ArchiveError::Io`] if the stream cannot be opened and positioned.
    pub fn open_read(&self, name: &str) -> Result<EntryReader<'_, S>> {
        let entry = self.index.lookup(name)?;
        self.open_entry(entry)
    }

    /// Open a specific entry taken from [`entries`](Self::entries).
    ///
    /// Unlike [`open_read`](Self::open_read) this skips name lookup, so it
    /// reaches every entry: names the lookup filter rejects, and every
    /// occurrence of a duplicated name.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArgument`] if `entry` does not belong
    /// to this archive.
    pub fn open_entry<'a>(&'a self, entry: &'a Entry) -> Result<EntryReader<'a, S>> {
        if !self.index.entries().as_ptr_range().contains(&std::ptr::from_ref(entry)) {
            return Err(ArchiveError::InvalidArgument(format!(
                "entry {:?} does not belong to {}",
                entry.name,
                self.path.display()
            )));
        }

        debug!(
            "Opening {:?} ({} bytes at offset {})",
            entry.name, entry.size, entry.start_offset
        );
        EntryReader::open(self, entry)
    }

    /// Always fails: archives are read-only.
    pub fn open_write(&self, _name: &str) -> Result<()> {
        Err(ArchiveError::NotSupported)
    }

    /// Always fails: archives are read-only.
    pub fn open_append(&self, _name: &str) -> Result<()> {
        Err(ArchiveError::NotSupported)
    }

    /// Always fails: archives are read-only.
    pub fn remove(&self, _name: &str) -> Result<()> {
        Err(ArchiveError::NotSupported)
    }

    /// Always fails: archives are read-only.
    pub fn mkdir(&self, _name: &str) -> Result<()> {
        Err(ArchiveError::NotSupported)
    }

    /// All entries, sorted by name.
    pub fn entries(&self) -> &[Entry] {
        self.index.entries()
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path the archive was opened from; every reader reopens it.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Variant the archive was loaded as.
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Modification time of the archive file as captured at open.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> std::fmt::Debug for Archive<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("entries", &self.index.len())
            .finish()
    }
}

fn is_root(dirname: &str) -> bool {
    dirname.is_empty() || dirname == "/"
}

/// Entry names of an archive in index order. Clone it to restart.
#[derive(Debug, Clone)]
pub struct Names<'a> {
    inner: slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Names<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| e.name.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Names<'_> {}
