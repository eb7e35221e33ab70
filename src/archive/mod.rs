//! Flat indexed archive reading.
//!
//! This module reads the simple "directory then payload" archives used by
//! several DOS-era games. Two variants are supported:
//!
//! - **GRP** (Build engine groupfiles): `"KenSilverman"` signature, 12-byte
//!   space-padded names, case-sensitive lookup.
//! - **MVL** (Descent II movie libraries): `"DMVL"` signature, 13-byte
//!   zero-padded names, case-insensitive lookup.
//!
//! ## Architecture
//!
//! - [`format`]: Static per-variant descriptors and format detection
//! - [`structures`]: Directory records and decoded entries
//! - [`loader`]: Header validation and directory decoding
//! - [`index`]: Sorted name index with binary-search lookup
//! - [`handle`]: The loaded [`Archive`] and its queries
//! - [`reader`]: Bounded per-entry [`EntryReader`]
//!
//! ## Limitations
//!
//! - Read-only; every write path fails with `NotSupported`
//! - No compression, encryption or subdirectories (none exist in either format)

mod format;
mod handle;
mod index;
mod loader;
mod reader;
mod structures;

pub use format::{
    ArchiveFormat, FormatDescriptor, FormatInfo, GRP, MVL, NameOrdering, NameRule, is_archive,
};
pub use handle::{Archive, Names};
pub use index::LookupIndex;
pub use loader::DirectoryLoader;
pub use reader::EntryReader;
pub use structures::*;
