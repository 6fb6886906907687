//! Scheduler for the crawl frontier and request pacing
//!
//! This module handles:
//! - The LIFO work stack of `(url, depth)` entries shared by all workers
//! - The in-memory visited set that lets exactly one worker claim a URL
//! - Tracking in-flight visits so workers know when the crawl is finished
//! - Global minimum spacing between requests, whatever the worker count

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use url::Url;

/// How an entry got onto the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    /// The seed URL given on the command line
    Seed,

    /// An unvisited URL re-queued from the index at startup
    Resume,

    /// A reference extracted from a fetched page, not yet checked against the index
    Link,
}

/// A URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to visit
    pub url: Url,

    /// Length of the path that reached this URL (the seed is depth 0)
    pub depth: u32,

    /// Where the entry came from
    pub source: EntrySource,
}

impl FrontierEntry {
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            source: EntrySource::Seed,
        }
    }

    pub fn resumed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            source: EntrySource::Resume,
        }
    }

    pub fn link(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            source: EntrySource::Link,
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    stack: Vec<FrontierEntry>,
    claimed: HashSet<String>,
    in_flight: usize,
}

/// Work stack shared between crawl workers
///
/// Entries pop in LIFO order, and `push_all` keeps the order it was given. So
/// with a single worker, a page's first link is explored completely before its
/// second link is looked at, the same as a recursive depth-first walk.
#[derive(Debug, Default)]
pub struct Scheduler {
    state: Mutex<FrontierState>,
    notify: Notify,
}

/// Marks one popped entry as in flight until dropped
///
/// Dropping the lease lets idle workers re-check whether the crawl is over.
#[must_use]
pub struct VisitLease<'a> {
    scheduler: &'a Scheduler,
    pub entry: FrontierEntry,
}

impl Drop for VisitLease<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.scheduler.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.scheduler.notify.notify_waiters();
    }
}

impl Scheduler {
    /// Creates a scheduler with an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // Frontier state stays consistent even if a worker panicked mid-update
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pushes entries so that the first one given is the next one popped
    pub fn push_all(&self, entries: Vec<FrontierEntry>) {
        if entries.is_empty() {
            return;
        }
        {
            let mut state = self.lock();
            state.stack.extend(entries.into_iter().rev());
        }
        self.notify.notify_waiters();
    }

    /// Pushes a single entry on top of the stack
    pub fn push(&self, entry: FrontierEntry) {
        self.push_all(vec![entry]);
    }

    /// Waits for the next entry to visit
    ///
    /// Returns None once the stack is empty and no visit is in flight, which
    /// means no further entries can appear.
    pub async fn next_entry(&self) -> Option<VisitLease<'_>> {
        loop {
            // Register before checking so a push between the check and the
            // await still wakes this worker
            let notified = self.notify.notified();

            {
                let mut state = self.lock();
                if let Some(entry) = state.stack.pop() {
                    state.in_flight += 1;
                    return Some(VisitLease {
                        scheduler: self,
                        entry,
                    });
                }
                if state.in_flight == 0 {
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Claims a URL for fetching in this run
    ///
    /// Returns false if it was already claimed, so at most one worker ever
    /// fetches a given URL per process.
    pub fn claim(&self, url: &str) -> bool {
        self.lock().claimed.insert(url.to_string())
    }

    /// Number of entries waiting on the stack
    pub fn frontier_size(&self) -> usize {
        self.lock().stack.len()
    }
}

/// Enforces a minimum spacing between requests across all workers
///
/// Each call reserves the next free slot, `delay` after the previous one (or
/// `delay` from now if the limiter has been idle), and sleeps until it.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_slot: Mutex::new(None),
        }
    }

    /// The configured spacing
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Reserves the next request slot without waiting
    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut last = self
            .last_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let base = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        let slot = base + self.delay;
        *last = Some(slot);
        slot
    }

    /// Waits until this caller may issue its request
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        let slot = self.reserve();
        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(path: &str) -> Url {
        Url::parse(&format!("http://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_new_scheduler() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.frontier_size(), 0);
    }

    #[tokio::test]
    async fn test_push_all_preserves_given_order() {
        let scheduler = Scheduler::new();
        scheduler.push_all(vec![
            FrontierEntry::link(url("/a"), 1),
            FrontierEntry::link(url("/b"), 1),
            FrontierEntry::link(url("/c"), 1),
        ]);

        let mut popped = Vec::new();
        while let Some(lease) = scheduler.next_entry().await {
            popped.push(lease.entry.url.path().to_string());
        }
        assert_eq!(popped, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_children_run_before_siblings() {
        let scheduler = Scheduler::new();
        scheduler.push_all(vec![
            FrontierEntry::link(url("/a"), 1),
            FrontierEntry::link(url("/b"), 1),
        ]);

        let first = scheduler.next_entry().await.unwrap();
        assert_eq!(first.entry.url.path(), "/a");
        scheduler.push_all(vec![FrontierEntry::link(url("/a/child"), 2)]);
        drop(first);

        let second = scheduler.next_entry().await.unwrap();
        assert_eq!(second.entry.url.path(), "/a/child");
        drop(second);

        let third = scheduler.next_entry().await.unwrap();
        assert_eq!(third.entry.url.path(), "/b");
    }

    #[tokio::test]
    async fn test_next_entry_empty_frontier() {
        let scheduler = Scheduler::new();
        assert!(scheduler.next_entry().await.is_none());
    }

    #[tokio::test]
    async fn test_idle_worker_waits_for_in_flight_visit() {
        let scheduler = Arc::new(Scheduler::new());
        scheduler.push(FrontierEntry::seed(url("/")));

        let lease = scheduler.next_entry().await.unwrap();

        let waiter = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move {
                scheduler
                    .next_entry()
                    .await
                    .map(|lease| lease.entry.url.path().to_string())
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        scheduler.push(FrontierEntry::link(url("/late"), 1));
        drop(lease);

        assert_eq!(waiter.await.unwrap(), Some("/late".to_string()));
    }

    #[tokio::test]
    async fn test_idle_worker_stops_when_last_visit_ends() {
        let scheduler = Arc::new(Scheduler::new());
        scheduler.push(FrontierEntry::seed(url("/")));
        let lease = scheduler.next_entry().await.unwrap();

        let waiter = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.next_entry().await.is_none() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(lease);

        assert!(waiter.await.unwrap());
    }

    #[test]
    fn test_claim_is_exclusive() {
        let scheduler = Scheduler::new();
        assert!(scheduler.claim("http://example.com/"));
        assert!(!scheduler.claim("http://example.com/"));
        assert!(!scheduler.claim("http://example.com/"));
        assert!(scheduler.claim("http://example.com/other"));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();

        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));

        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_limiter_is_global_across_tasks() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(50)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.wait().await;
                    Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap().duration_since(start));
        }
        finished.sort();

        // Each task gets its own slot, 50ms after the previous one
        for (elapsed, slot) in finished.into_iter().zip(1..=3u64) {
            assert!(elapsed >= Duration::from_millis(50 * slot));
        }
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_wait() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
