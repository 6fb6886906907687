//! Content-addressed page store
//!
//! Every fetched body lands directly under the base directory, named by the
//! hex-encoded SHA-256 of the exact URL string it was fetched from.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Flat, content-addressed store of fetched page bodies
#[derive(Debug, Clone)]
pub struct ContentStore {
    base_dir: PathBuf,
}

impl ContentStore {
    /// Creates a store rooted at `base_dir`
    ///
    /// The directory itself is created by the caller.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Derives the stable filename for a URL
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_mirror::storage::ContentStore;
    ///
    /// let name = ContentStore::filename_for("http://example.com/");
    /// assert_eq!(name.len(), 64);
    /// assert_eq!(name, ContentStore::filename_for("http://example.com/"));
    /// ```
    pub fn filename_for(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Full path a URL's body is stored at
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.base_dir.join(Self::filename_for(url))
    }

    /// Writes `body` under the URL's filename, replacing any earlier copy
    ///
    /// # Returns
    ///
    /// The path the body was written to
    pub async fn write(&self, url: &str, body: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path_for(url);
        tokio::fs::write(&path, body).await?;
        tracing::debug!("Saved {} bytes for {} to {}", body.len(), url, path.display());
        Ok(path)
    }
}
