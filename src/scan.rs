//! One pass over every configured feed.
//!
//! For each feed: fetch, parse, then for each item in document order check
//! the seen cache, notify the hook, and record the item once the hook has
//! been reached. A failing feed or item never aborts the rest of the cycle.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::app::Result;
use crate::domain::{FeedEntry, Fingerprint, Item};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::notifier::Notifier;
use crate::store::SeenStore;

/// Feeds scanned concurrently per cycle. One keeps configuration order.
pub const DEFAULT_WORKERS: usize = 1;

/// What happened to a single feed's items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub delivered: usize,
    pub already_seen: usize,
    pub failed: usize,
}

/// Totals for a whole cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub feeds: usize,
    pub failed_feeds: usize,
    pub delivered: usize,
    pub already_seen: usize,
    pub failed_deliveries: usize,
}

impl CycleReport {
    fn record(&mut self, result: &Result<FeedReport>) {
        self.feeds += 1;
        match result {
            Ok(report) => {
                self.delivered += report.delivered;
                self.already_seen += report.already_seen;
                self.failed_deliveries += report.failed;
            }
            Err(_) => self.failed_feeds += 1,
        }
    }
}

#[derive(Clone)]
pub struct ScanCycle {
    feeds: Arc<Vec<FeedEntry>>,
    store: Arc<dyn SeenStore>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    notifier: Arc<dyn Notifier + Send + Sync>,
    normalizer: Normalizer,
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl ScanCycle {
    pub fn new(
        feeds: Vec<FeedEntry>,
        store: Arc<dyn SeenStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        notifier: Arc<dyn Notifier + Send + Sync>,
    ) -> Self {
        Self {
            feeds: Arc::new(feeds),
            store,
            fetcher,
            notifier,
            normalizer: Normalizer::new(),
            semaphore: Arc::new(Semaphore::new(DEFAULT_WORKERS)),
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        let workers = workers.max(1);
        self.semaphore = Arc::new(Semaphore::new(workers));
        self.workers = workers;
        self
    }

    pub fn feeds(&self) -> &[FeedEntry] {
        &self.feeds
    }

    /// Scan every feed once.
    pub async fn run(&self) -> CycleReport {
        let start = Instant::now();
        let mut report = CycleReport::default();

        if self.workers <= 1 {
            for entry in self.feeds.iter() {
                let result = self.scan_feed(entry).await;
                log_feed_result(entry, &result);
                report.record(&result);
            }
        } else {
            for (entry, result) in self.scan_parallel().await {
                log_feed_result(&entry, &result);
                report.record(&result);
            }
        }

        tracing::info!(
            "Cycle complete: {} feeds ({} failed), {} delivered, {} already seen, {} delivery errors ({:.1}s)",
            report.feeds,
            report.failed_feeds,
            report.delivered,
            report.already_seen,
            report.failed_deliveries,
            start.elapsed().as_secs_f64()
        );

        report
    }

    async fn scan_parallel(&self) -> Vec<(FeedEntry, Result<FeedReport>)> {
        let mut handles = Vec::new();

        for entry in self.feeds.iter().cloned() {
            let this = self.clone();

            let handle = tokio::spawn(async move {
                let _permit = this.semaphore.acquire().await.ok();
                let result = this.scan_feed(&entry).await;
                (entry, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }

    /// Fetch, parse and deliver the new items of one feed.
    ///
    /// Errors are fetch or parse failures; per-item problems are counted
    /// in the report instead.
    pub async fn scan_feed(&self, entry: &FeedEntry) -> Result<FeedReport> {
        let body = self.fetcher.fetch(&entry.feed_url).await?;
        let items = self.normalizer.normalize(&body)?;

        let mut report = FeedReport::default();
        for item in &items {
            match self.process_item(entry, item).await {
                ItemOutcome::Delivered => report.delivered += 1,
                ItemOutcome::AlreadySeen => report.already_seen += 1,
                ItemOutcome::Failed => report.failed += 1,
            }
        }

        Ok(report)
    }

    async fn process_item(&self, entry: &FeedEntry, item: &Item) -> ItemOutcome {
        let id = item.identifier();
        if id.is_empty() {
            tracing::warn!(
                "Item {:?} from {} has neither guid nor link, skipping",
                item.display_title(),
                entry.feed_url
            );
            return ItemOutcome::Failed;
        }

        let fingerprint = Fingerprint::new(&entry.feed_url, id);

        match self.store.is_new(&fingerprint) {
            Ok(true) => {}
            Ok(false) => return ItemOutcome::AlreadySeen,
            Err(e) => {
                tracing::error!("Cache lookup for {} failed: {}", id, e);
                return ItemOutcome::Failed;
            }
        }

        if let Err(e) = self.notifier.notify(&entry.hook_url, item).await {
            tracing::warn!("Failed to notify {} about {}: {}", entry.hook_url, id, e);
            return ItemOutcome::Failed;
        }

        tracing::info!(
            "Delivered {:?} from {} to {}",
            item.display_title(),
            entry.feed_url,
            entry.hook_url
        );

        let link = item.link.as_deref().unwrap_or("");
        if let Err(e) = self.store.mark_seen(&fingerprint, link) {
            // The hook has the item already; it will be sent again next cycle.
            tracing::error!("Failed to record {} as seen: {}", id, e);
        }

        ItemOutcome::Delivered
    }
}

enum ItemOutcome {
    Delivered,
    AlreadySeen,
    Failed,
}

fn log_feed_result(entry: &FeedEntry, result: &Result<FeedReport>) {
    match result {
        Ok(report) if report.delivered > 0 => {
            tracing::info!("  {} new items from {}", report.delivered, entry.feed_url);
        }
        Ok(_) => {
            tracing::debug!("  No new items from {}", entry.feed_url);
        }
        Err(e) => {
            tracing::warn!("  Error scanning {}: {}", entry.feed_url, e);
        }
    }
}
