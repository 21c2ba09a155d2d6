//! # sweeper-core
//!
//! Session pipeline for sweeper.
//!
//! This crate provides:
//! - Uploaded files and their content hashes
//! - The table loader and a load cache keyed by file name and content hash
//! - Per-file session state with read-modify-write updates
//! - The exporter producing CSV and XLSX downloads
//! - [`Pipeline`], which runs one user [`Action`] at a time
//!
//! ```
//! use sweeper_core::{Action, Outcome, Pipeline, TargetFormat, UploadedFile};
//!
//! let mut pipeline = Pipeline::default();
//! let file = UploadedFile::new("scores.csv", b"name,score\nann,1\nann,1\nbob,".to_vec());
//! pipeline.handle(Action::Upload(vec![file])).unwrap();
//!
//! pipeline.deduplicate("scores.csv").unwrap();
//! pipeline.fill_missing("scores.csv").unwrap();
//!
//! let download = pipeline.export("scores.csv", TargetFormat::Excel).unwrap();
//! assert_eq!(download.file_name, "scores.xlsx");
//! ```

/// Configuration file support.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Table export.
pub mod export;
/// Source and target formats.
pub mod format;
/// Table loader and load cache.
pub mod loader;
/// The action pipeline.
pub mod pipeline;
/// Table previews.
pub mod preview;
/// Session state.
pub mod session;
/// Uploaded files.
pub mod upload;

pub use config::SweeperConfig;
pub use error::{SweeperError, SweeperResult};
pub use export::{export, Download};
pub use format::{SourceFormat, TargetFormat};
pub use loader::{load, CacheStatus, LoadCache};
pub use pipeline::{
    Action, CleanAction, CleanReport, FileSummary, Outcome, Pipeline, UploadReport, UploadStatus,
};
pub use preview::{clamp_rows, TablePreview};
pub use session::{FileMetadata, SessionEntry, SessionStore};
pub use upload::{ContentHash, UploadedFile};

/// Re-export the table crate.
pub use sweeper_table as table;
/// Re-export the visualization crate.
pub use sweeper_viz as viz;
