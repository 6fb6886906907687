//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a single attempt per URL
//! - Attribute-scan link extraction
//! - The LIFO frontier, per-run claims, and request pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use parser::{extract_attribute_values, extract_links, HREF, SRC};
pub use scheduler::{EntrySource, FrontierEntry, RateLimiter, Scheduler, VisitLease};

use crate::config::Config;
use crate::Result;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the base directory and open the index
/// 2. Re-queue every URL left unvisited by earlier runs
/// 3. Build the HTTP client
/// 4. Fetch and store pages, depth-first from the seed
/// 5. Follow extracted links up to the configured depth
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
/// * `seed` - Absolute URL to start from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(MirrorError)` - Crawl failed
pub async fn crawl(config: Config, seed: &Url) -> Result<CrawlReport> {
    run_crawl(config, seed).await
}
