//! Uploaded files and their content hashes.

use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// SHA-256 of an upload's bytes, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file received from the user. Immutable once created.
///
/// The name is the file's identity within a session.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    extension: String,
    content: Arc<[u8]>,
    hash: ContentHash,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let content = content.into();
        let extension = declared_extension(&name);
        let hash = ContentHash::of(&content);
        Self {
            name,
            extension,
            content,
            hash,
        }
    }

    /// Read a file from disk, using its file name as identity.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Ok(Self::new(name, content))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased extension including the dot, or empty if there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }
}

fn declared_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_extension() {
        assert_eq!(UploadedFile::new("sales.CSV", b"a".to_vec()).extension(), ".csv");
        assert_eq!(UploadedFile::new("book.v2.xlsx", b"a".to_vec()).extension(), ".xlsx");
        assert_eq!(UploadedFile::new("README", b"a".to_vec()).extension(), "");
    }

    #[test]
    fn test_content_hash_depends_on_bytes_only() {
        let a = UploadedFile::new("a.csv", b"k,v\n1,2".to_vec());
        let b = UploadedFile::new("b.csv", b"k,v\n1,2".to_vec());
        let c = UploadedFile::new("a.csv", b"k,v\n1,3".to_vec());

        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
        assert_eq!(a.hash().as_str().len(), 64);
        assert_eq!(a.size(), 7);
    }
}
