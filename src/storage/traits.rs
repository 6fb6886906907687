//! Index trait and error types
//!
//! This module defines the interface the crawl engine uses to consult and update
//! the durable visitation index.

use crate::storage::{IndexStats, UrlRecord};
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Index lock poisoned")]
    Poisoned,
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Durable record of every URL ever discovered and its fetch status
///
/// The index is the authority for deduplication and resume. Reads fail open:
/// a storage error on `exists` or `is_visited` is reported as "not found", so
/// the crawler prefers a re-fetch over stalling.
pub trait VisitIndex {
    /// Records that `url` has been discovered
    ///
    /// Inserts a record with no visit timestamp and no content path. If a record
    /// for `url` already exists, the uniqueness violation is absorbed and the
    /// existing record's visit timestamp is set to now instead; its content path
    /// is left alone.
    fn record_discovered(&mut self, url: &str) -> IndexResult<()>;

    /// Sets the stored content path of an existing record
    ///
    /// Never creates a record. Returns `false` if `url` was not in the index.
    fn record_fetched(&mut self, url: &str, content_path: &str) -> IndexResult<bool>;

    /// Sets the content path and the visit timestamp together
    ///
    /// Used once a fetch has succeeded and its body is on disk. Returns `false`
    /// if `url` was not in the index.
    fn complete_visit(&mut self, url: &str, content_path: &str) -> IndexResult<bool>;

    /// Returns true if a record for `url` exists, visited or not
    fn exists(&self, url: &str) -> bool;

    /// Returns true if a record for `url` exists and has a visit timestamp
    fn is_visited(&self, url: &str) -> bool;

    /// Returns every URL without a visit timestamp, in discovery order
    ///
    /// The result is a snapshot taken at call time.
    fn unvisited_urls(&self) -> IndexResult<Vec<String>>;

    /// Gets the full record for a URL
    fn get_record(&self, url: &str) -> IndexResult<Option<UrlRecord>>;

    /// Counts records by fetch status
    fn stats(&self) -> IndexResult<IndexStats>;
}
