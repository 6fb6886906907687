//! Statistics generation from the visitation index
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::{IndexStats, VisitIndex};
use crate::MirrorError;

/// Crawl statistics summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of URLs ever discovered
    pub total_urls: u64,

    /// URLs fetched successfully at least once
    pub visited: u64,

    /// URLs that will be re-queued by the next run
    pub pending: u64,

    /// URLs with a stored body on disk
    pub stored: u64,
}

impl From<IndexStats> for CrawlStatistics {
    fn from(stats: IndexStats) -> Self {
        Self {
            total_urls: stats.total,
            visited: stats.visited,
            pending: stats.pending,
            stored: stats.stored,
        }
    }
}

impl CrawlStatistics {
    /// Share of discovered URLs that have been visited, as a percentage
    pub fn visited_percentage(&self) -> f64 {
        percentage(self.visited, self.total_urls)
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Loads statistics from the index
///
/// # Arguments
///
/// * `index` - The index to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(MirrorError)` - Failed to query statistics
pub fn load_statistics(index: &dyn VisitIndex) -> Result<CrawlStatistics, MirrorError> {
    Ok(index.stats()?.into())
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs discovered: {}", stats.total_urls);
    println!(
        "  Visited: {} ({:.1}%)",
        stats.visited,
        stats.visited_percentage()
    );
    println!(
        "  Pending: {} ({:.1}%)",
        stats.pending,
        percentage(stats.pending, stats.total_urls)
    );
    println!("  Stored bodies: {}", stats.stored);
    println!();

    if stats.pending > 0 {
        println!(
            "The next run will re-queue {} unvisited URL{}.",
            stats.pending,
            if stats.pending == 1 { "" } else { "s" }
        );
    } else {
        println!("No unvisited URLs; the next run starts from the seed only.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteIndex;

    #[test]
    fn test_crawl_statistics_from_index_stats() {
        let stats = CrawlStatistics::from(IndexStats {
            total: 150,
            visited: 100,
            pending: 50,
            stored: 100,
        });

        assert_eq!(stats.total_urls, 150);
        assert_eq!(stats.pending, 50);
        assert!((stats.visited_percentage() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = CrawlStatistics::from(IndexStats::default());
        assert_eq!(stats.visited_percentage(), 0.0);
    }

    #[test]
    fn test_load_statistics() {
        let mut index = SqliteIndex::new_in_memory().unwrap();
        index.record_discovered("http://example.com/").unwrap();
        index.record_discovered("http://example.com/a").unwrap();
        index
            .complete_visit("http://example.com/", "/tmp/mirror/abc")
            .unwrap();

        let stats = load_statistics(&index).unwrap();
        assert_eq!(
            stats,
            CrawlStatistics {
                total_urls: 2,
                visited: 1,
                pending: 1,
                stored: 1,
            }
        );
    }
}
