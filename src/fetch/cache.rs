use crate::error::Result;
use crate::fetch::source::SheetSource;
use crate::models::RowSet;
use crate::readers::SheetReader;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Last successful ingestion of one source.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub rows: Arc<RowSet>,
    pub fetched_at: DateTime<Utc>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Time-boxed cache of ingested sheets, keyed by source id.
///
/// Entries expire after `ttl` or when cleared explicitly. Failed fetches are
/// never stored, so the next call retries.
pub struct SheetCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SheetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // entries are inserted whole; a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached rows for `source` if still fresh, otherwise fetch and ingest.
    pub async fn get_or_fetch(
        &self,
        source: &dyn SheetSource,
        reader: &SheetReader,
    ) -> Result<Arc<RowSet>> {
        if let Some(entry) = self.fresh_entry(source.id()) {
            debug!(source = source.id(), fetched_at = %entry.fetched_at, "Sheet cache hit");
            return Ok(entry.rows);
        }

        info!(source = source.id(), "Sheet cache miss, fetching");
        let text = source.fetch_text().await?;
        let rows = Arc::new(reader.ingest(&text)?);

        // the lock is not held across the fetch; concurrent misses may both
        // fetch and the last insert wins
        self.lock().insert(
            source.id().to_string(),
            CacheEntry {
                rows: Arc::clone(&rows),
                fetched_at: Utc::now(),
                stored_at: Instant::now(),
            },
        );

        Ok(rows)
    }

    pub fn fresh_entry(&self, source_id: &str) -> Option<CacheEntry> {
        self.lock()
            .get(source_id)
            .filter(|entry| entry.is_fresh(self.ttl))
            .cloned()
    }

    /// When `source_id` was last fetched successfully.
    pub fn fetched_at(&self, source_id: &str) -> Option<DateTime<Utc>> {
        self.lock().get(source_id).map(|entry| entry.fetched_at)
    }

    pub fn invalidate(&self, source_id: &str) -> bool {
        self.lock().remove(source_id).is_some()
    }

    /// Drop every entry ("refresh now").
    pub fn clear(&self) {
        let mut entries = self.lock();
        debug!(entries = entries.len(), "Clearing sheet cache");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SheetSource for CountingSource {
        fn id(&self) -> &str {
            "counting"
        }

        async fn fetch_text(&self) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(ProcessingError::FetchStatus {
                    url: "counting".into(),
                    status: 503,
                });
            }
            Ok(format!("posto,lat,long,registros\nA,1,2,{}\n", n))
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() -> Result<()> {
        let cache = SheetCache::new(Duration::from_secs(60));
        assert_eq!(cache.ttl(), Duration::from_secs(60));
        let source = CountingSource::new(false);
        let reader = SheetReader::new();

        let first = cache.get_or_fetch(&source, &reader).await?;
        let second = cache.get_or_fetch(&source, &reader).await?;

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.fetched_at("counting").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() -> Result<()> {
        let cache = SheetCache::new(Duration::ZERO);
        let source = CountingSource::new(false);
        let reader = SheetReader::new();

        cache.get_or_fetch(&source, &reader).await?;
        let rows = cache.get_or_fetch(&source, &reader).await?;

        assert_eq!(source.calls(), 2);
        assert_eq!(rows.rows[0].get("registros"), Some("2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() -> Result<()> {
        let cache = SheetCache::new(Duration::from_secs(60));
        let source = CountingSource::new(false);
        let reader = SheetReader::new();

        cache.get_or_fetch(&source, &reader).await?;
        cache.clear();
        assert!(cache.is_empty());

        cache.get_or_fetch(&source, &reader).await?;
        assert_eq!(source.calls(), 2);

        assert!(cache.invalidate("counting"));
        assert!(!cache.invalidate("counting"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = SheetCache::new(Duration::from_secs(60));
        let source = CountingSource::new(true);
        let reader = SheetReader::new();

        assert!(cache.get_or_fetch(&source, &reader).await.is_err());
        assert!(cache.get_or_fetch(&source, &reader).await.is_err());

        assert_eq!(source.calls(), 2);
        assert_eq!(cache.len(), 0);
    }
}
