//! Session configuration.
//!
//! An optional YAML file tunes preview size, CSV parsing and the server
//! bind address. Every field has a default, so an empty file is valid.
//!
//! ```yaml
//! preview_rows: 20
//! csv:
//!   delimiter: ";"
//!   null_values: ["NA", "-"]
//! server:
//!   bind: "0.0.0.0:8080"
//!   max_upload_bytes: 104857600
//! ```

use crate::error::{SweeperError, SweeperResult};
use crate::preview::DEFAULT_PREVIEW_ROWS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use sweeper_table::{CsvOptions, DEFAULT_NULL_VALUES};

/// Environment variable naming the config file when none is passed.
pub const CONFIG_ENV: &str = "SWEEPER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Rows shown by a preview when the request names no count.
    pub preview_rows: usize,
    pub csv: CsvConfig,
    pub server: ServerConfig,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            csv: CsvConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Single-byte field delimiter.
    pub delimiter: char,
    /// Tokens read as missing values.
    pub null_values: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Largest accepted upload body; unset means no limit beyond memory.
    pub max_upload_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            max_upload_bytes: None,
        }
    }
}

impl SweeperConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the YAML is malformed or a value is invalid.
    pub fn from_yaml_str(content: &str) -> SweeperResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| SweeperError::Config(format!("Failed to parse YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> SweeperResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SweeperError::Config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load from `path`, else from the file named by `SWEEPER_CONFIG`, else
    /// fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a named file cannot be read or parsed.
    pub fn discover(path: Option<&Path>) -> SweeperResult<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> SweeperResult<()> {
        if !self.csv.delimiter.is_ascii() {
            return Err(SweeperError::Config(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.csv.delimiter
            )));
        }
        Ok(())
    }

    /// CSV reader options derived from this config.
    #[must_use]
    pub fn csv_options(&self) -> CsvOptions {
        // validate() guarantees an ASCII delimiter
        let delimiter = u8::try_from(self.csv.delimiter).unwrap_or(b',');
        CsvOptions::default()
            .with_delimiter(delimiter)
            .with_null_values(self.csv.null_values.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SweeperConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SweeperConfig::default());
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.csv_options().delimiter, b',');
    }

    #[test]
    fn test_partial_document() {
        let config = SweeperConfig::from_yaml_str("csv:\n  delimiter: \";\"\n").unwrap();
        assert_eq!(config.csv.delimiter, ';');
        assert_eq!(config.csv.null_values.len(), DEFAULT_NULL_VALUES.len());
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.server.max_upload_bytes, None);

        let options = config.csv_options();
        assert_eq!(options.delimiter, b';');
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = SweeperConfig::from_yaml_str("csv:\n  delimiter: \"§\"\n").unwrap_err();
        assert!(matches!(err, SweeperError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweeper.yaml");
        fs::write(
            &path,
            "preview_rows: 25\nserver:\n  bind: \"0.0.0.0:8080\"\n  max_upload_bytes: 1024\n",
        )
        .unwrap();

        let config = SweeperConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.preview_rows, 25);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.max_upload_bytes, Some(1024));

        let missing = SweeperConfig::from_file(&dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(SweeperError::Config(_))));
    }
}
