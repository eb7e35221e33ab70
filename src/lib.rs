//! # flatarc
//!
//! Reader for flat indexed legacy game archives.
//!
//! Build engine groupfiles (`.GRP`) and Descent II movie libraries (`.MVL`)
//! are both a signature, a table of fixed-width `{name, size}` records and
//! the file payloads concatenated in table order. This library loads the
//! table once, sorts it for lookup and hands out bounded readers that each
//! own their own stream, so the archive is never pulled into memory whole.
//!
//! ## Features
//!
//! - Both variants behind one engine, with format auto-detection
//! - Case-sensitive (GRP) or case-insensitive (MVL) name lookup
//! - Independent, bounds-checked readers implementing [`std::io::Read`]
//! - Pluggable byte storage: local filesystem or in-memory images
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use flatarc::{Archive, ArchiveFormat};
//!
//! fn main() -> anyhow::Result<()> {
//!     let archive = Archive::open("DUKE3D.GRP", ArchiveFormat::Grp)?;
//!
//!     // List all files in the archive
//!     for name in archive.enumerate("")? {
//!         println!("{}", name);
//!     }
//!
//!     let mut data = Vec::new();
//!     archive.open_read("GAME.CON")?.read_to_end(&mut data)?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod io;

pub use archive::{Archive, ArchiveFormat, Entry, EntryReader};
pub use cli::Cli;
pub use error::{ArchiveError, Result};
pub use io::{LocalStorage, MemoryStorage, Storage};
