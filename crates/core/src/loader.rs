//! Table loading and the per-file load cache.

use crate::format::SourceFormat;
use crate::upload::{ContentHash, UploadedFile};
use serde::Serialize;
use std::collections::HashMap;
use sweeper_table::{CsvOptions, Result, Table};
use tracing::debug;

/// Parse bytes into a table, choosing the codec from the declared extension.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for extensions other than `.csv` and `.xlsx`,
/// or the codec's error if the bytes cannot be parsed.
pub fn load(bytes: &[u8], extension: &str, options: &CsvOptions) -> Result<Table> {
    match SourceFormat::from_extension(extension)? {
        SourceFormat::Csv => Table::from_csv_bytes(bytes, options),
        SourceFormat::Xlsx => Table::from_xlsx_bytes(bytes),
    }
}

/// What the cache did with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Same name and same bytes as a previous load.
    Hit,
    /// First load under this name.
    Miss,
    /// The name was known but its bytes changed.
    Replaced,
}

impl CacheStatus {
    /// Whether the session entry must be (re)seeded from the loaded table.
    #[must_use]
    pub fn seeds_session(self) -> bool {
        !matches!(self, Self::Hit)
    }
}

#[derive(Debug, Clone)]
struct CachedLoad {
    hash: ContentHash,
    table: Table,
}

/// Loaded tables keyed by file identity and content hash.
///
/// Loading is deterministic, so an identical upload can reuse the table
/// parsed last time. New bytes under a known name evict the old entry.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<String, CachedLoad>,
}

impl LoadCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an upload, reusing the cached table when name and bytes match.
    ///
    /// A failed load leaves the cache untouched.
    ///
    /// # Errors
    ///
    /// Returns the loader's error for unsupported or malformed input.
    pub fn load(&mut self, file: &UploadedFile, options: &CsvOptions) -> Result<(Table, CacheStatus)> {
        let previous = self.entries.get(file.name());
        if let Some(cached) = previous {
            if &cached.hash == file.hash() {
                debug!(file = file.name(), "load cache hit");
                return Ok((cached.table.clone(), CacheStatus::Hit));
            }
        }
        let status = if previous.is_some() {
            CacheStatus::Replaced
        } else {
            CacheStatus::Miss
        };

        let table = load(file.content(), file.extension(), options)?;
        debug!(
            file = file.name(),
            rows = table.row_count(),
            columns = table.col_count(),
            ?status,
            "parsed upload"
        );
        self.entries.insert(
            file.name().to_string(),
            CachedLoad {
                hash: file.hash().clone(),
                table: table.clone(),
            },
        );
        Ok((table, status))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
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
