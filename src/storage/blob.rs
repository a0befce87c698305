//! Blob storage for uploaded documents
//!
//! A write-once directory of plain files. The relational store keeps the
//! full path; blobs are never renamed or deleted by the bot.

use std::path::{Path, PathBuf};

/// Handle to the blob directory
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the blob directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-or-relative path a blob with this name lives at.
    pub fn blob_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

/// Builds the collision-resistant on-disk name for an upload:
/// `<ownerId>_<cleanName>_<unixTimestamp><ext>`.
///
/// `clean_name` is the sanitized original name (extension included), `ext`
/// the original extension; the timestamp keeps repeated uploads of the same
/// document from clobbering each other.
pub fn blob_name(owner_id: i64, clean_name: &str, ext: &str, unix_timestamp: i64) -> String {
    format!("{}_{}_{}{}", owner_id, clean_name, unix_timestamp, ext)
}

/// Returns true if the stored path still points at a regular file.
pub async fn blob_exists(path: &str) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
