//! Static descriptors for the supported archive variants.
//!
//! Both variants share one engine; everything that differs between them
//! lives in a [`FormatDescriptor`]: the signature, the directory record
//! layout, how a name field is decoded and how names are ordered.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ArchiveError, Result};
use crate::io::Storage;

use super::loader::DirectoryLoader;

/// How a fixed-width name field is turned into a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Zero-padded; the name ends at the first NUL or the field end.
    NulPadded,
    /// Space-padded with no terminator; trailing spaces are trimmed.
    SpacePadded,
}

/// Ordering used both for sorting the index and for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrdering {
    /// Byte-wise ordinal comparison.
    CaseSensitive,
    /// Ordinal comparison after ASCII lowercasing.
    CaseInsensitive,
}

impl NameOrdering {
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            NameOrdering::CaseSensitive => a.as_bytes().cmp(b.as_bytes()),
            NameOrdering::CaseInsensitive => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
        }
    }
}

/// Human-facing metadata advertised for a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub extension: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub url: &'static str,
}

/// Byte layout and naming rules of one archive variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub magic: &'static [u8],
    /// Width of the name field in a directory record.
    pub name_width: usize,
    pub name_rule: NameRule,
    pub ordering: NameOrdering,
    pub info: FormatInfo,
}

impl FormatDescriptor {
    /// Size of the signature plus the 32-bit entry count.
    pub const fn header_size(&self) -> u64 {
        self.magic.len() as u64 + 4
    }

    /// Size of one `{name, size}` directory record.
    pub const fn record_size(&self) -> u64 {
        self.name_width as u64 + 4
    }

    /// Offset of the first payload byte for an archive of `count` entries.
    pub const fn payload_start(&self, count: u32) -> u64 {
        self.header_size() + self.record_size() * count as u64
    }

    /// Decode a raw name field according to [`NameRule`].
    ///
    /// Each byte becomes the character with the same code point (Latin-1),
    /// so DOS code page names keep one character per byte and the raw bytes
    /// stay recoverable with [`Entry::raw_name`](super::Entry::raw_name).
    pub fn decode_name(&self, raw: &[u8]) -> String {
        let raw = &raw[..raw.len().min(self.name_width)];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let mut name = &raw[..end];
        if self.name_rule == NameRule::SpacePadded {
            while let [rest @ .., b' '] = name {
                name = rest;
            }
        }
        name.iter().map(|&b| char::from(b)).collect()
    }
}

/// Descent II Movielib: `"DMVL"`, 13-byte zero-padded names.
pub const MVL: FormatDescriptor = FormatDescriptor {
    magic: b"DMVL",
    name_width: 13,
    name_rule: NameRule::NulPadded,
    ordering: NameOrdering::CaseInsensitive,
    info: FormatInfo {
        extension: "MVL",
        description: "Descent II Movielib format",
        author: "Bradley Bell <btb@icculus.org>",
        url: "http://icculus.org/physfs/",
    },
};

/// Build engine groupfile: `"KenSilverman"`, 12-byte space-padded names.
pub const GRP: FormatDescriptor = FormatDescriptor {
    magic: b"KenSilverman",
    name_width: 12,
    name_rule: NameRule::SpacePadded,
    ordering: NameOrdering::CaseSensitive,
    info: FormatInfo {
        extension: "GRP",
        description: "Build engine Groupfile format",
        author: "Ryan C. Gordon <icculus@icculus.org>",
        url: "http://icculus.org/physfs/",
    },
};

/// The closed set of supported archive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Mvl,
    Grp,
}

impl ArchiveFormat {
    /// Every supported variant, in detection order.
    pub const ALL: [ArchiveFormat; 2] = [ArchiveFormat::Mvl, ArchiveFormat::Grp];

    pub const fn descriptor(self) -> &'static FormatDescriptor {
        match self {
            ArchiveFormat::Mvl => &MVL,
            ArchiveFormat::Grp => &GRP,
        }
    }

    pub const fn info(self) -> &'static FormatInfo {
        &self.descriptor().info
    }

    /// Read the header of `path` and return its entry count.
    ///
    /// Fails with [`ArchiveError::UnsupportedFormat`] on a signature mismatch.
    pub fn probe<S: Storage>(self, storage: &S, path: &Path) -> Result<u32> {
        let mut stream = storage.open_read(path)?;
        let count = DirectoryLoader::new(self.descriptor()).read_header(&mut stream);
        storage.close(stream)?;
        count
    }

    /// Find the first variant whose signature matches `path`.
    pub fn detect<S: Storage>(storage: &S, path: &Path) -> Result<ArchiveFormat> {
        for format in Self::ALL {
            match format.probe(storage, path) {
                Ok(_) => return Ok(format),
                Err(ArchiveError::UnsupportedFormat) => continue,
                // A header too short for this variant may still fit another.
                Err(ArchiveError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(ArchiveError::UnsupportedFormat)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().extension)
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.info().extension.eq_ignore_ascii_case(s))
            .ok_or_else(|| ArchiveError::InvalidArgument(format!("unknown archive format: {s}")))
    }
}

/// Cheap signature check: is `path` an archive of `format`?
///
/// Signature mismatches and truncated headers yield `Ok(false)`; only
/// failures to open or read the file are errors.
pub fn is_archive<S: Storage>(storage: &S, path: &Path, format: ArchiveFormat) -> Result<bool> {
    match format.probe(storage, path) {
        Ok(_) => Ok(true),
        Err(ArchiveError::UnsupportedFormat) => Ok(false),
        Err(ArchiveError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
