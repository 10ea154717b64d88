use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::entry::GlossaryEntry;

/// A loaded working set and the moment it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub entries: Arc<Vec<GlossaryEntry>>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(entries: Vec<GlossaryEntry>, fetched_at: DateTime<Utc>) -> Self {
        CacheEntry {
            entries: Arc::new(entries),
            fetched_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

#[cfg(feature = "web")]
pub use self::table_cache::TableCache;

#[cfg(feature = "web")]
mod table_cache {
    use chrono::{DateTime, Duration, Utc};
    use log::debug;
    use tokio::sync::Mutex;

    use super::CacheEntry;
    use crate::error::Result;
    use crate::loader::DataSource;

    /// Working-set cache in front of a data source.
    ///
    /// The lock is held across a fetch, so concurrent requests that find the
    /// entry stale wait for one load instead of starting their own. A failed
    /// load leaves the previous entry in place.
    pub struct TableCache {
        source: DataSource,
        ttl: Duration,
        entry: Mutex<Option<CacheEntry>>,
    }

    impl TableCache {
        pub fn new(source: DataSource, ttl: Duration) -> Self {
            TableCache {
                source,
                ttl,
                entry: Mutex::new(None),
            }
        }

        pub async fn get(&self) -> Result<CacheEntry> {
            self.get_at(Utc::now()).await
        }

        /// Return the cached working set, reloading it if absent or older than the TTL
        pub async fn get_at(&self, now: DateTime<Utc>) -> Result<CacheEntry> {
            let mut slot = self.entry.lock().await;

            if let Some(entry) = slot.as_ref() {
                if !entry.is_expired(now, self.ttl) {
                    debug!("Glossary cache hit (fetched at {})", entry.fetched_at);
                    return Ok(entry.clone());
                }
            }

            let entry = CacheEntry::new(self.source.load().await?, now);
            *slot = Some(entry.clone());
            Ok(entry)
        }
    }
}
