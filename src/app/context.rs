use std::sync::Arc;

use crate::app::Result;
use crate::config::{load_feeds, Settings};
use crate::daemon::Scheduler;
use crate::domain::FeedEntry;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::notifier::{HttpNotifier, Notifier};
use crate::scan::ScanCycle;
use crate::store::SqliteSeenStore;

/// Everything a running relay needs, built once at startup.
pub struct AppContext {
    pub settings: Settings,
    pub feeds: Vec<FeedEntry>,
    pub store: Arc<SqliteSeenStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
}

impl AppContext {
    /// Load the feed list and open the cache. Both failures are fatal.
    pub fn new(settings: Settings) -> Result<Self> {
        let feeds = load_feeds(&settings.config_path)?;
        let store = Arc::new(SqliteSeenStore::open(settings.cache_path()?)?);

        Self::with_store(settings, feeds, store)
    }

    pub fn with_store(
        settings: Settings,
        feeds: Vec<FeedEntry>,
        store: Arc<SqliteSeenStore>,
    ) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(settings.fetch_timeout)?);
        let notifier: Arc<dyn Notifier + Send + Sync> =
            Arc::new(HttpNotifier::new(settings.notify_timeout)?);

        Ok(Self {
            settings,
            feeds,
            store,
            fetcher,
            notifier,
        })
    }

    pub fn scan_cycle(&self) -> ScanCycle {
        ScanCycle::new(
            self.feeds.clone(),
            self.store.clone(),
            self.fetcher.clone(),
            self.notifier.clone(),
        )
        .with_workers(self.settings.workers)
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.scan_cycle(), self.settings.interval)
    }

    /// Drop every component and close the cache.
    ///
    /// If a scan cycle still holds the store it is closed on drop instead.
    pub fn close(self) -> Result<()> {
        let Self { store, .. } = self;
        match Arc::try_unwrap(store) {
            Ok(store) => store.close(),
            Err(_) => {
                tracing::warn!("Cache still in use at shutdown, leaving it to drop");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::app::FeedhookError;
    use crate::config::CACHE_FILE_NAME;

    #[test]
    fn test_new_loads_feeds_and_creates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("feeds.conf");
        let mut file = std::fs::File::create(&config).unwrap();
        writeln!(file, "# feeds").unwrap();
        writeln!(file, "http://example.com/feed=http://hook.local/x").unwrap();

        let ctx = AppContext::new(Settings::new(&config)).unwrap();

        assert_eq!(
            ctx.feeds,
            vec![FeedEntry::new("http://example.com/feed", "http://hook.local/x")]
        );
        assert!(dir.path().join(CACHE_FILE_NAME).exists());
        ctx.close().unwrap();
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppContext::new(Settings::new(dir.path().join("nope.conf")));

        assert!(matches!(result, Err(FeedhookError::ConfigFile { .. })));
    }

    #[test]
    fn test_unopenable_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("feeds.conf");
        std::fs::write(&config, "").unwrap();

        let mut settings = Settings::new(&config);
        settings.cache_path = Some(dir.path().join("missing-dir").join("cache.db"));

        let result = AppContext::new(settings);
        assert!(matches!(
            result,
            Err(FeedhookError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn test_scan_cycle_carries_feeds() {
        let settings = Settings::new("feeds.conf");
        let feeds = vec![FeedEntry::new("http://example.com/feed", "http://hook.local/x")];
        let store = Arc::new(SqliteSeenStore::in_memory().unwrap());

        let ctx = AppContext::with_store(settings, feeds.clone(), store).unwrap();

        assert_eq!(ctx.scan_cycle().feeds(), feeds.as_slice());
    }
}
