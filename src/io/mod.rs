mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use std::io::{self, Read, Seek};
use std::path::Path;
use std::time::SystemTime;

/// Source of independent byte streams onto archive files.
///
/// Every call to [`open_read`](Storage::open_read) must return a stream with
/// its own position, so that several readers on the same path never share a
/// cursor.
pub trait Storage: Send + Sync {
    /// Stream type handed out for each open.
    type Stream: Read + Seek + Send;

    /// Open a fresh read-only stream positioned at the start of `path`.
    fn open_read(&self, path: &Path) -> io::Result<Self::Stream>;

    /// Last modification time of the file at `path`.
    fn last_modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Release a stream obtained from [`open_read`](Storage::open_read).
    fn close(&self, stream: Self::Stream) -> io::Result<()> {
        drop(stream);
        Ok(())
    }
}

impl<S: Storage> Storage for &S {
    type Stream = S::Stream;

    fn open_read(&self, path: &Path) -> io::Result<Self::Stream> {
        (**self).open_read(path)
    }

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
        (**self).last_modified(path)
    }

    fn close(&self, stream: Self::Stream) -> io::Result<()> {
        (**self).close(stream)
    }
}

/// Read up to `buf.len()` bytes, stopping early only at end of stream.
///
/// Returns the number of bytes actually read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
