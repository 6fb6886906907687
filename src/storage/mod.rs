//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler keeps on disk:
//! - The SQLite visitation index (one row per discovered URL)
//! - Dedup and resume queries against that index
//! - The flat, content-addressed store of fetched bodies

mod content;
mod schema;
mod sqlite;
mod traits;

pub use content::ContentStore;
pub use sqlite::SqliteIndex;
pub use traits::{IndexError, IndexResult, VisitIndex};

use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens or creates the visitation index
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteIndex)` - Successfully opened index
/// * `Err(IndexError)` - Failed to open or initialize the index
pub fn open_index(path: &Path) -> IndexResult<SqliteIndex> {
    SqliteIndex::open(path)
}

/// Represents a URL in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub visited_at: Option<DateTime<Utc>>,
    pub content_path: Option<String>,
}

impl UrlRecord {
    /// Returns true once the URL has been fetched successfully
    pub fn is_visited(&self) -> bool {
        self.visited_at.is_some()
    }
}

/// Record counts across the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Every URL ever discovered
    pub total: u64,

    /// URLs with a visit timestamp
    pub visited: u64,

    /// URLs discovered but not yet visited (the resume set)
    pub pending: u64,

    /// URLs with a stored content path
    pub stored: u64,
}
