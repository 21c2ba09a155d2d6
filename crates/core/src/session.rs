//! Per-file session state.

use crate::error::{SweeperError, SweeperResult};
use crate::format::SourceFormat;
use crate::upload::UploadedFile;
use indexmap::IndexMap;
use serde::Serialize;
use sweeper_table::{Result as TableResult, Table};

/// Metadata of the upload a session entry was seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub name: String,
    pub size: usize,
    pub format: SourceFormat,
    pub content_hash: String,
}

impl FileMetadata {
    /// Metadata for an upload whose extension is already known to be supported.
    #[must_use]
    pub fn new(file: &UploadedFile, format: SourceFormat) -> Self {
        Self {
            name: file.name().to_string(),
            size: file.size(),
            format,
            content_hash: file.hash().to_string(),
        }
    }
}

/// The current table of one file plus where it came from.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub metadata: FileMetadata,
    pub table: Table,
}

/// Current tables of a session, keyed by file identity in upload order.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: IndexMap<String, SessionEntry>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SessionEntry> {
        self.entries.get(name)
    }

    /// Current table of a file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` if nothing was uploaded under `name`.
    pub fn table(&self, name: &str) -> SweeperResult<&Table> {
        self.get(name)
            .map(|entry| &entry.table)
            .ok_or_else(|| SweeperError::not_loaded(name))
    }

    /// Seed or overwrite the entry for `metadata.name`.
    pub fn set(&mut self, metadata: FileMetadata, table: Table) {
        let name = metadata.name.clone();
        self.entries.insert(name, SessionEntry { metadata, table });
    }

    /// Read-modify-write of a file's table.
    ///
    /// `f` sees the current table; its result replaces it only on success,
    /// so a failed transform leaves the entry unchanged.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown name, or the error of `f`.
    pub fn update<F>(&mut self, name: &str, f: F) -> SweeperResult<&Table>
    where
        F: FnOnce(&Table) -> TableResult<Table>,
    {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| SweeperError::not_loaded(name))?;
        entry.table = f(&entry.table)?;
        Ok(&entry.table)
    }

    /// File identities in upload order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
