//! Output module for reporting on a mirror
//!
//! This module handles:
//! - Summarizing the visitation index for `--stats`
//! - Rendering the end-of-crawl report

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;

/// Formats a finished crawl's report as a single line
///
/// # Arguments
///
/// * `report` - The report returned by the crawl
pub fn format_report(report: &CrawlReport) -> String {
    format!(
        "{} fetched, {} failed, {} resumed, {} links found",
        report.fetched, report.failed, report.resumed, report.links_found
    )
}
