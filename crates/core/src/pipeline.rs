//! The session pipeline.
//!
//! Every user interaction is one [`Action`] handed to [`Pipeline::handle`],
//! which runs it to completion against the session state and returns an
//! [`Outcome`]. Cleaning actions are read-modify-write cycles on the stored
//! table: a rejected transform leaves the table as it was.

use crate::config::SweeperConfig;
use crate::error::SweeperResult;
use crate::export::{export, Download};
use crate::format::{SourceFormat, TargetFormat};
use crate::loader::{CacheStatus, LoadCache};
use crate::preview::TablePreview;
use crate::session::{FileMetadata, SessionStore};
use crate::upload::UploadedFile;
use serde::Serialize;
use sweeper_table::{CsvOptions, Table};
use sweeper_viz::SeriesPair;
use tracing::{info, warn};

/// A user action against the session.
#[derive(Debug, Clone)]
pub enum Action {
    /// Load a batch of files; failures are reported per file.
    Upload(Vec<UploadedFile>),
    /// List uploaded files.
    ListFiles,
    Preview { file: String, rows: Option<usize> },
    Deduplicate { file: String },
    FillMissing { file: String },
    SelectColumns { file: String, columns: Vec<String> },
    Visualize { file: String },
    Export { file: String, target: TargetFormat },
}

/// Result of a handled action.
#[derive(Debug, Clone)]
pub enum Outcome {
    Uploaded(Vec<UploadReport>),
    Files(Vec<FileSummary>),
    Preview(TablePreview),
    Cleaned(CleanReport),
    Chart(SeriesPair),
    Download(Download),
}

/// How one file of an upload batch fared.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub file: String,
    #[serde(flatten)]
    pub status: UploadStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadStatus {
    Loaded {
        cache: CacheStatus,
        preview: TablePreview,
    },
    Skipped {
        reason: String,
    },
}

impl UploadReport {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, UploadStatus::Loaded { .. })
    }
}

/// Cleaning actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanAction {
    Deduplicate,
    FillMissing,
    SelectColumns,
}

/// Effect of a cleaning action plus the updated preview.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub action: CleanAction,
    pub rows_before: usize,
    pub rows_after: usize,
    pub missing_before: usize,
    pub missing_after: usize,
    pub preview: TablePreview,
}

impl CleanReport {
    #[must_use]
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    #[must_use]
    pub fn cells_filled(&self) -> usize {
        self.missing_before.saturating_sub(self.missing_after)
    }
}

/// One line of the file listing.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    #[serde(flatten)]
    pub metadata: FileMetadata,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Loader, load cache and session state of one interactive run.
#[derive(Debug, Default)]
pub struct Pipeline {
    config: SweeperConfig,
    csv_options: CsvOptions,
    cache: LoadCache,
    session: SessionStore,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: SweeperConfig) -> Self {
        let csv_options = config.csv_options();
        Self {
            config,
            csv_options,
            cache: LoadCache::new(),
            session: SessionStore::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Current table of a file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file.
    pub fn table(&self, file: &str) -> SweeperResult<&Table> {
        self.session.table(file)
    }

    /// Run one action to completion.
    ///
    /// # Errors
    ///
    /// Returns the action's error; the session is left as it was before
    /// the action.
    pub fn handle(&mut self, action: Action) -> SweeperResult<Outcome> {
        match action {
            Action::Upload(files) => Ok(Outcome::Uploaded(self.upload_all(&files))),
            Action::ListFiles => Ok(Outcome::Files(self.files())),
            Action::Preview { file, rows } => self.preview(&file, rows).map(Outcome::Preview),
            Action::Deduplicate { file } => self.deduplicate(&file).map(Outcome::Cleaned),
            Action::FillMissing { file } => self.fill_missing(&file).map(Outcome::Cleaned),
            Action::SelectColumns { file, columns } => {
                self.select_columns(&file, &columns).map(Outcome::Cleaned)
            }
            Action::Visualize { file } => self.visualize(&file).map(Outcome::Chart),
            Action::Export { file, target } => self.export(&file, target).map(Outcome::Download),
        }
    }

    /// Load files one after another. A file that fails is skipped and
    /// reported; the rest of the batch still loads.
    pub fn upload_all(&mut self, files: &[UploadedFile]) -> Vec<UploadReport> {
        files
            .iter()
            .map(|file| match self.upload(file) {
                Ok(report) => report,
                Err(e) => {
                    warn!(file = file.name(), error = %e, "skipping upload");
                    UploadReport {
                        file: file.name().to_string(),
                        status: UploadStatus::Skipped {
                            reason: e.to_string(),
                        },
                    }
                }
            })
            .collect()
    }

    /// Load a single file and seed its session entry.
    ///
    /// Identical bytes under a known name keep the current, possibly
    /// cleaned, table. New bytes replace it.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` or a parse error; nothing is changed.
    pub fn upload(&mut self, file: &UploadedFile) -> SweeperResult<UploadReport> {
        let format = SourceFormat::from_extension(file.extension())?;
        let (table, cache) = self.cache.load(file, &self.csv_options)?;
        if cache.seeds_session() || self.session.get(file.name()).is_none() {
            self.session.set(FileMetadata::new(file, format), table);
        }
        info!(
            file = file.name(),
            size = file.size(),
            %format,
            ?cache,
            "file loaded"
        );
        let preview = self.preview(file.name(), None)?;
        Ok(UploadReport {
            file: file.name().to_string(),
            status: UploadStatus::Loaded { cache, preview },
        })
    }

    pub fn files(&self) -> Vec<FileSummary> {
        self.session
            .entries()
            .map(|entry| FileSummary {
                metadata: entry.metadata.clone(),
                rows: entry.table.row_count(),
                columns: entry
                    .table
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })
            .collect()
    }

    /// Preview the current table. `rows` defaults to the configured count.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file.
    pub fn preview(&self, file: &str, rows: Option<usize>) -> SweeperResult<TablePreview> {
        let table = self.session.table(file)?;
        let requested = rows.unwrap_or(self.config.preview_rows);
        Ok(TablePreview::new(file, table, Some(requested)))
    }

    /// Remove duplicate rows, keeping first occurrences.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file.
    pub fn deduplicate(&mut self, file: &str) -> SweeperResult<CleanReport> {
        self.clean(file, CleanAction::Deduplicate, |t| Ok(t.drop_duplicates()))
    }

    /// Replace missing numeric values with zero.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file.
    pub fn fill_missing(&mut self, file: &str) -> SweeperResult<CleanReport> {
        self.clean(file, CleanAction::FillMissing, |t| Ok(t.fill_missing_numeric()))
    }

    /// Keep only `columns`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` if a requested column does not exist; the
    /// stored table is not modified.
    pub fn select_columns<S: AsRef<str>>(
        &mut self,
        file: &str,
        columns: &[S],
    ) -> SweeperResult<CleanReport> {
        self.clean(file, CleanAction::SelectColumns, |t| t.project(columns))
    }

    fn clean<F>(&mut self, file: &str, action: CleanAction, f: F) -> SweeperResult<CleanReport>
    where
        F: FnOnce(&Table) -> sweeper_table::Result<Table>,
    {
        let before = self.session.table(file)?;
        let (rows_before, missing_before) = (before.row_count(), before.missing_count());

        let after = self.session.update(file, f).map_err(|e| {
            warn!(file, ?action, error = %e, "transform rejected");
            e
        })?;
        let (rows_after, missing_after) = (after.row_count(), after.missing_count());
        info!(file, ?action, rows_before, rows_after, missing_after, "table cleaned");

        Ok(CleanReport {
            action,
            rows_before,
            rows_after,
            missing_before,
            missing_after,
            preview: self.preview(file, None)?,
        })
    }

    /// First two numeric columns of the current table.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file.
    pub fn visualize(&self, file: &str) -> SweeperResult<SeriesPair> {
        Ok(SeriesPair::from_table(self.session.table(file)?))
    }

    /// Serialize the current table.
    ///
    /// # Errors
    ///
    /// Returns `FileNotLoaded` for an unknown file, or a writer error.
    pub fn export(&self, file: &str, target: TargetFormat) -> SweeperResult<Download> {
        let table = self.session.table(file)?;
        Ok(export(table, target, file)?)
    }
}

impl From<SweeperConfig> for Pipeline {
    fn from(config: SweeperConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweeperError;

    fn upload(pipeline: &mut Pipeline, name: &str, content: &str) -> Vec<UploadReport> {
        let file = UploadedFile::new(name, content.as_bytes().to_vec());
        match pipeline.handle(Action::Upload(vec![file])).unwrap() {
            Outcome::Uploaded(reports) => reports,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_upload_batch_skips_unsupported() {
        let mut pipeline = Pipeline::default();
        let files = vec![
            UploadedFile::new("notes.txt", b"hello".to_vec()),
            UploadedFile::new("data.csv", b"k,v\na,1".to_vec()),
        ];
        let reports = pipeline.upload_all(&files);

        assert!(!reports[0].is_loaded());
        assert!(reports[1].is_loaded());
        assert_eq!(pipeline.session().len(), 1);
        match &reports[0].status {
            UploadStatus::Skipped { reason } => assert!(reason.contains(".txt")),
            UploadStatus::Loaded { .. } => panic!("txt should be skipped"),
        }
    }

    #[test]
    fn test_clean_report_counts() {
        let mut pipeline = Pipeline::default();
        upload(&mut pipeline, "d.csv", "k,v\na,1\na,1\nb,\nc,");

        let report = pipeline.deduplicate("d.csv").unwrap();
        assert_eq!(report.rows_removed(), 1);
        assert_eq!(report.preview.total_rows, 3);

        let report = pipeline.fill_missing("d.csv").unwrap();
        assert_eq!(report.cells_filled(), 2);
        assert_eq!(report.missing_after, 0);
    }

    #[test]
    fn test_identical_reupload_keeps_cleaned_table() {
        let mut pipeline = Pipeline::default();
        upload(&mut pipeline, "d.csv", "k\na\na");
        pipeline.deduplicate("d.csv").unwrap();

        let reports = upload(&mut pipeline, "d.csv", "k\na\na");
        assert!(matches!(
            reports[0].status,
            UploadStatus::Loaded { cache: CacheStatus::Hit, .. }
        ));
        assert_eq!(pipeline.table("d.csv").unwrap().row_count(), 1);

        let reports = upload(&mut pipeline, "d.csv", "k\na\na\nb");
        assert!(matches!(
            reports[0].status,
            UploadStatus::Loaded { cache: CacheStatus::Replaced, .. }
        ));
        assert_eq!(pipeline.table("d.csv").unwrap().row_count(), 3);
    }

    #[test]
    fn test_preview_uses_configured_rows() {
        let config = SweeperConfig {
            preview_rows: 12,
            ..SweeperConfig::default()
        };
        let mut pipeline = Pipeline::new(config);
        let csv: String = std::iter::once("n".to_string())
            .chain((0..20).map(|i| i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        upload(&mut pipeline, "n.csv", &csv);

        assert_eq!(pipeline.preview("n.csv", None).unwrap().shown_rows(), 12);
        assert_eq!(pipeline.preview("n.csv", Some(2)).unwrap().shown_rows(), 10);
        assert_eq!(pipeline.preview("n.csv", Some(50)).unwrap().shown_rows(), 20);
    }

    #[test]
    fn test_actions_on_unknown_file() {
        let mut pipeline = Pipeline::default();
        let err = pipeline
            .handle(Action::Visualize {
                file: "ghost.csv".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, SweeperError::FileNotLoaded { .. }));
    }
}
