//! Error types for archive operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Unsupported archive format")]
    UnsupportedFormat,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Out of memory allocating {count} directory entries")]
    OutOfMemory { count: u32 },

    #[error("Operation not supported: archive is read-only")]
    NotSupported,

    #[error("No such file: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Seek past end of file: offset {offset}, length {length}")]
    PastEof { offset: u64, length: u64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ArchiveError {
    /// True for a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArchiveError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
