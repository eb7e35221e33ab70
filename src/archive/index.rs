//! Sorted name index over the directory.

use std::cmp::Ordering;
use tracing::warn;

use crate::error::{ArchiveError, Result};

use super::format::NameOrdering;
use super::structures::{Entry, MAX_NAME_LEN};

/// Entries sorted by name, answering lookups by binary search.
///
/// The sort is stable, and lookups land on the lowest matching position, so
/// when a name occurs more than once the entry appearing first in the
/// archive directory is the one returned.
#[derive(Debug, Clone)]
pub struct LookupIndex {
    entries: Vec<Entry>,
    ordering: NameOrdering,
}

impl LookupIndex {
    /// Sort `entries` (given in file order) with `ordering`.
    pub fn build(mut entries: Vec<Entry>, ordering: NameOrdering) -> Self {
        entries.sort_by(|a, b| ordering.compare(&a.name, &b.name));

        let duplicates = entries
            .windows(2)
            .filter(|w| ordering.compare(&w[0].name, &w[1].name) == Ordering::Equal)
            .count();
        if duplicates > 0 {
            warn!(
                "Archive directory has {} duplicate name(s); only the first occurrence is reachable",
                duplicates
            );
        }

        Self { entries, ordering }
    }

    /// Find the entry called `name`.
    pub fn lookup(&self, name: &str) -> Result<&Entry> {
        if !is_searchable(name) {
            return Err(ArchiveError::NotFound(name.to_string()));
        }

        let pos = self
            .entries
            .partition_point(|e| self.ordering.compare(&e.name, name) == Ordering::Less);
        match self.entries.get(pos) {
            Some(entry) if self.ordering.compare(&entry.name, name) == Ordering::Equal => Ok(entry),
            _ => Err(ArchiveError::NotFound(name.to_string())),
        }
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn ordering(&self) -> NameOrdering {
        self.ordering
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rule out names neither variant can store: anything with a directory
/// separator, longer than 8.3 allows, or with an extension over 3 chars.
///
/// Lengths count characters; stored names hold one character per byte.
fn is_searchable(name: &str) -> bool {
    if name.contains('/') || name.chars().count() > MAX_NAME_LEN {
        return false;
    }
    match name.rfind('.') {
        Some(dot) => name[dot..].chars().count() <= 4,
        None => true,
    }
}
