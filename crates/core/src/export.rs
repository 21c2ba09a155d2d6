//! Exporting tables as downloadable files.

use crate::format::TargetFormat;
use std::path::Path;
use sweeper_table::{Result, Table};
use tracing::info;

/// A serialized table ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Serialize a table in the target format.
///
/// The download is named after `original_name` with its last extension
/// swapped for the target's.
///
/// # Errors
///
/// Returns error if the table cannot be written.
pub fn export(table: &Table, target: TargetFormat, original_name: &str) -> Result<Download> {
    let bytes = match target {
        TargetFormat::Csv => table.to_csv_bytes()?,
        TargetFormat::Excel => table.to_xlsx_bytes()?,
    };
    let file_name = swap_extension(original_name, target.extension());
    info!(file = %file_name, bytes = bytes.len(), %target, "exported table");
    Ok(Download {
        bytes,
        file_name,
        mime_type: target.mime_type(),
    })
}

fn swap_extension(name: &str, extension: &str) -> String {
    Path::new(name)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}
