//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the other components together:
//! - Opening the content directory and the visitation index
//! - Seeding the frontier and re-queuing unvisited URLs from earlier runs
//! - Running the worker tasks that fetch, store, and extract links
//! - Reporting progress and final counts

use crate::config::Config;
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::{EntrySource, FrontierEntry, RateLimiter, Scheduler};
use crate::crawler::{FetchOutcome, Fetcher};
use crate::storage::{ContentStore, IndexError, IndexResult, IndexStats, SqliteIndex, VisitIndex};
use crate::url::resolve_against;
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Number of successful fetches between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Summary of a finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched and stored in this run
    pub fetched: u64,

    /// Visits abandoned because of a fetch, write, or index failure
    pub failed: u64,

    /// Unvisited URLs re-queued from earlier runs
    pub resumed: u64,

    /// Resolvable references extracted from fetched pages
    pub links_found: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicU64,
    failed: AtomicU64,
    links_found: AtomicU64,
}

/// Main crawler coordinator structure
///
/// Cloning is cheap; every clone shares the same index, store, and client.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    index: Arc<Mutex<SqliteIndex>>,
    store: Arc<ContentStore>,
    fetcher: Fetcher,
    limiter: Arc<RateLimiter>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Creates the base directory if needed and opens the index inside it. Both
    /// are fatal on failure.
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self> {
        let base_dir = &config.storage.base_dir;
        std::fs::create_dir_all(base_dir)?;

        let index_path = config.storage.index_path();
        let index = SqliteIndex::open(&index_path)?;
        tracing::debug!("Opened index at {}", index_path.display());

        let fetcher = Fetcher::new(&config.http)?;
        let limiter = RateLimiter::new(config.crawler.request_delay);
        let store = ContentStore::new(base_dir.clone());

        Ok(Self {
            config: Arc::new(config),
            index: Arc::new(Mutex::new(index)),
            store: Arc::new(store),
            fetcher,
            limiter: Arc::new(limiter),
        })
    }

    /// Returns the configuration this coordinator was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Counts the records currently in the index
    pub fn index_stats(&self) -> Result<IndexStats> {
        Ok(self.with_index(|index| index.stats())?)
    }

    /// Runs `f` with exclusive access to the index
    ///
    /// The guard lives only for the call, so it is never held across an await.
    fn with_index<T>(
        &self,
        f: impl FnOnce(&mut SqliteIndex) -> IndexResult<T>,
    ) -> IndexResult<T> {
        let mut index = self.index.lock().map_err(|_| IndexError::Poisoned)?;
        f(&mut index)
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// The stack starts with the seed at the bottom and every unvisited URL
    /// from earlier runs above it, so resumed work is done first. All entries
    /// start at depth 0.
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute URL to start from
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The frontier was exhausted
    /// * `Err(MirrorError)` - The index could not be read or a worker panicked
    pub async fn run(&self, seed: &Url) -> Result<CrawlReport> {
        let unvisited = self.with_index(|index| index.unvisited_urls())?;

        let mut resumed = Vec::with_capacity(unvisited.len());
        for raw in unvisited {
            match Url::parse(&raw) {
                Ok(url) => resumed.push(FrontierEntry::resumed(url)),
                Err(e) => tracing::warn!("Skipping unparseable indexed URL {}: {}", raw, e),
            }
        }

        let resumed_count = resumed.len() as u64;
        if resumed_count > 0 {
            tracing::info!("Resuming {} unvisited URLs from the index", resumed_count);
        }

        let scheduler = Arc::new(Scheduler::new());
        scheduler.push(FrontierEntry::seed(seed.clone()));
        scheduler.push_all(resumed);

        let counters = Arc::new(Counters::default());
        let started = Instant::now();
        let workers = self.config.crawler.workers.max(1);

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} worker{}, {:?} between requests)",
            seed,
            self.config.crawler.max_depth,
            workers,
            if workers == 1 { "" } else { "s" },
            self.limiter.delay()
        );

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let coordinator = self.clone();
            let scheduler = Arc::clone(&scheduler);
            let counters = Arc::clone(&counters);
            tasks.spawn(async move {
                coordinator
                    .work(worker, &scheduler, &counters, started)
                    .await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            joined?;
        }

        let report = CrawlReport {
            fetched: counters.fetched.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            resumed: resumed_count,
            links_found: counters.links_found.load(Ordering::Relaxed),
        };

        match self.index_stats() {
            Ok(stats) => tracing::info!(
                "Crawl completed in {:?}: {} fetched, {} failed; index holds {} URLs, {} pending",
                started.elapsed(),
                report.fetched,
                report.failed,
                stats.total,
                stats.pending
            ),
            Err(e) => tracing::info!(
                "Crawl completed in {:?}: {} fetched, {} failed (index stats unavailable: {})",
                started.elapsed(),
                report.fetched,
                report.failed,
                e
            ),
        }

        Ok(report)
    }

    /// Pops and visits entries until the scheduler reports the crawl is over
    async fn work(&self, worker: u32, scheduler: &Scheduler, counters: &Counters, started: Instant) {
        tracing::trace!("Worker {} started", worker);

        while let Some(lease) = scheduler.next_entry().await {
            if let Err(e) = self.visit(&lease.entry, scheduler, counters, started).await {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Abandoning {}: {}", lease.entry.url, e);
            }
        }

        tracing::trace!("Worker {} finished", worker);
    }

    /// Visits a single frontier entry
    ///
    /// This method:
    /// 1. Gates extracted links on whether the index already knows them
    /// 2. Skips URLs already visited, too deep, or claimed by another worker
    /// 3. Records the URL if it is new
    /// 4. Waits for a request slot and fetches the page
    /// 5. Stores the body and marks the URL visited
    /// 6. Pushes every resolvable reference on the page at `depth + 1`
    async fn visit(
        &self,
        entry: &FrontierEntry,
        scheduler: &Scheduler,
        counters: &Counters,
        started: Instant,
    ) -> Result<()> {
        let url = entry.url.as_str();

        if entry.source == EntrySource::Link {
            let is_new = self.with_index(|index| {
                if index.exists(url) {
                    return Ok(false);
                }
                index.record_discovered(url)?;
                Ok(true)
            })?;
            if !is_new {
                tracing::trace!("Already indexed: {}", url);
                return Ok(());
            }
        }

        if self.with_index(|index| Ok(index.is_visited(url)))? {
            tracing::trace!("Already visited: {}", url);
            return Ok(());
        }

        if entry.depth > self.config.crawler.max_depth {
            tracing::debug!(
                "Not fetching {}: depth {} exceeds max depth {}",
                url,
                entry.depth,
                self.config.crawler.max_depth
            );
            return Ok(());
        }

        if !scheduler.claim(url) {
            tracing::trace!("Already claimed in this run: {}", url);
            return Ok(());
        }

        self.with_index(|index| {
            if !index.exists(url) {
                index.record_discovered(url)?;
            }
            Ok(())
        })?;

        self.limiter.wait().await;

        tracing::debug!("Fetching {} (depth {})", url, entry.depth);
        let body = match self.fetcher.fetch(url).await {
            FetchOutcome::Fetched { body } => body,
            FetchOutcome::Failed { reason } => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Failed to fetch {}: {}", url, reason);
                return Ok(());
            }
        };

        let path = self.store.write(url, &body).await?;
        let content_path = path.to_string_lossy();
        self.with_index(|index| index.complete_visit(url, &content_path))?;

        let fetched = counters.fetched.fetch_add(1, Ordering::Relaxed) + 1;
        if fetched % PROGRESS_INTERVAL == 0 {
            let rate = fetched as f64 / started.elapsed().as_secs_f64();
            tracing::info!(
                "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                fetched,
                scheduler.frontier_size(),
                rate
            );
        }

        let next_depth = entry.depth.saturating_add(1);
        let mut children = Vec::new();
        for reference in extract_links(&body) {
            match resolve_against(&reference, &entry.url) {
                Ok(link) => children.push(FrontierEntry::link(link, next_depth)),
                Err(e) => tracing::debug!("Dropping reference on {}: {}", url, e),
            }
        }

        tracing::debug!("Found {} links on {}", children.len(), url);
        counters
            .links_found
            .fetch_add(children.len() as u64, Ordering::Relaxed);
        scheduler.push_all(children);

        Ok(())
    }
}

/// Runs a complete crawl from `seed`
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
/// * `seed` - Absolute URL to start from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(MirrorError)` - Crawl could not start or a worker failed
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::{load_config, validate_seed};
/// use sumi_mirror::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// let seed = validate_seed("https://example.com/")?;
/// let report = run_crawl(config, &seed).await?;
/// println!("fetched {} pages", report.fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, seed: &Url) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(seed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, HttpConfig, StorageConfig};
    use crate::MirrorError;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(dir: &TempDir, max_depth: u32) -> Config {
        Config {
            crawler: CrawlerConfig {
                max_depth,
                request_delay: Duration::ZERO,
                workers: 1,
            },
            http: HttpConfig::default(),
            storage: StorageConfig {
                base_dir: dir.path().join("mirror"),
                index_file: "sqlite.db".to_string(),
            },
        }
    }

    #[test]
    fn test_coordinator_creation() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir, 2);

        let coordinator = Coordinator::new(config).unwrap();

        assert!(dir.path().join("mirror").is_dir());
        assert!(dir.path().join("mirror").join("sqlite.db").is_file());
        assert_eq!(coordinator.config().crawler.max_depth, 2);
        assert_eq!(coordinator.index_stats().unwrap(), IndexStats::default());
    }

    #[test]
    fn test_creation_fails_when_base_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mirror"), b"not a directory").unwrap();

        let result = Coordinator::new(create_test_config(&dir, 1));
        assert!(matches!(result, Err(MirrorError::Io(_))));
    }

    #[tokio::test]
    async fn test_report_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="/ok">ok</a><a href="/gone">gone</a>"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("leaf"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let coordinator = Coordinator::new(create_test_config(&dir, 1)).unwrap();
        let seed = Url::parse(&format!("{}/", server.uri())).unwrap();

        let report = coordinator.run(&seed).await.unwrap();

        assert_eq!(
            report,
            CrawlReport {
                fetched: 2,
                failed: 1,
                resumed: 0,
                links_found: 2,
            }
        );

        let stats = coordinator.index_stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.visited, 2);
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn test_first_link_is_explored_before_its_sibling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="/a">a</a><a href="/b">b</a>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/a1">a1</a>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("leaf"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("leaf"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let coordinator = Coordinator::new(create_test_config(&dir, 3)).unwrap();
        let seed = Url::parse(&format!("{}/", server.uri())).unwrap();
        coordinator.run(&seed).await.unwrap();

        let order: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/", "/a", "/a1", "/b"]);
    }
}
