//! In-memory station collection with cache-then-network loading.
//!
//! The collection is held as an immutable [`StationSnapshot`] behind an
//! `Arc`. Refreshes build a new snapshot and swap it in, so readers always
//! see a complete collection.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheError, CacheRepository, DEFAULT_TTL};
use crate::domain::StationRecord;
use crate::feed::{BrandFilter, FeedClient, FeedError, normalize};

/// Notice shown on the map when no station data could be loaded at all.
pub const LOAD_FAILURE_NOTICE: &str =
    "Error loading station data from the fuel price service. Please try again later.";

/// Where the current collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Nothing loaded yet.
    Empty,
    /// A cache entry younger than the TTL.
    Cache,
    /// The live feed.
    Network,
    /// An expired cache entry, used because the feed failed.
    StaleCache,
}

/// An immutable view of the station collection.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    pub stations: Vec<StationRecord>,
    pub source: DataSource,
    /// When the data was fetched from the feed.
    pub fetched_at: Option<DateTime<Utc>>,
    /// The feed's own publication timestamp.
    pub published_at: Option<String>,
    /// User-visible problem with the data, if any.
    pub notice: Option<String>,
}

impl StationSnapshot {
    /// The collection before anything has been loaded.
    pub fn empty() -> Self {
        Self {
            stations: Vec::new(),
            source: DataSource::Empty,
            fetched_at: None,
            published_at: None,
            notice: None,
        }
    }

    fn from_entry(entry: CacheEntry, source: DataSource) -> Self {
        let fetched_at = entry.written_at();
        Self {
            stations: entry.data.stations,
            source,
            fetched_at,
            published_at: entry.data.published_at,
            notice: None,
        }
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Distinct non-empty provinces, sorted.
    pub fn provinces(&self) -> Vec<String> {
        self.stations
            .iter()
            .map(|s| s.province.trim())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Result of a refresh, for logging and the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The feed was fetched and the collection replaced.
    Fetched { stations: usize },
    /// The feed failed; the cached entry was installed instead.
    FellBack { stations: usize, error: String },
    /// The feed failed and no cache entry was usable.
    Failed { error: String },
}

/// Configuration for the data store.
#[derive(Debug, Clone)]
pub struct DataStoreConfig {
    /// How long a cache entry counts as fresh.
    pub ttl: Duration,
    /// Which stations to keep from the feed.
    pub brand: BrandFilter,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            brand: BrandFilter::default(),
        }
    }
}

/// Owns the station collection and keeps it up to date.
pub struct DataStore {
    client: FeedClient,
    cache: Arc<dyn CacheRepository>,
    config: DataStoreConfig,
    snapshot: RwLock<Arc<StationSnapshot>>,
    /// Holds the in-flight fetch so overlapping refreshes share one request.
    inflight: MokaCache<(), Arc<StationSnapshot>>,
}

impl DataStore {
    /// Create a store with an empty collection.
    pub fn new(
        client: FeedClient,
        cache: Arc<dyn CacheRepository>,
        config: DataStoreConfig,
    ) -> Self {
        Self {
            client,
            cache,
            config,
            snapshot: RwLock::new(Arc::new(StationSnapshot::empty())),
            inflight: MokaCache::builder().max_capacity(1).build(),
        }
    }

    /// The current collection.
    pub async fn snapshot(&self) -> Arc<StationSnapshot> {
        let guard = self.snapshot.read().await;
        Arc::clone(&guard)
    }

    /// Startup sequence: install a fresh cache entry if there is one, then
    /// revalidate against the feed in the background.
    ///
    /// Returns the handle of the background refresh.
    pub async fn load(self: &Arc<Self>) -> JoinHandle<RefreshOutcome> {
        if self.load_from_cache().await {
            info!(
                stations = self.snapshot().await.len(),
                "serving stations from local cache while revalidating"
            );
        }

        let store = Arc::clone(self);
        tokio::spawn(async move { store.refresh().await })
    }

    /// Install the cache entry if it is present, valid and fresh.
    ///
    /// Returns whether anything was installed.
    pub async fn load_from_cache(&self) -> bool {
        let Some(entry) = self.read_cache() else {
            debug!("no station cache entry");
            return false;
        };

        if !entry.is_fresh(Utc::now(), self.config.ttl) {
            debug!(
                age_mins = entry.age(Utc::now()).num_minutes(),
                "station cache expired"
            );
            return false;
        }

        self.install(Arc::new(StationSnapshot::from_entry(entry, DataSource::Cache)))
            .await;
        true
    }

    /// Fetch the feed once and replace the collection.
    ///
    /// On failure, falls back to the cache entry regardless of its age. If
    /// there is none, the current collection is kept and a notice is
    /// attached to it. Errors never propagate to the caller.
    ///
    /// A refresh requested while another is running waits for that one
    /// and shares its result.
    pub async fn refresh(&self) -> RefreshOutcome {
        let result = self.inflight.try_get_with((), self.fetch_and_store()).await;
        self.inflight.invalidate(&()).await;

        match result {
            Ok(snapshot) => RefreshOutcome::Fetched {
                stations: snapshot.len(),
            },
            Err(error) => self.fall_back(&error).await,
        }
    }

    async fn fetch_and_store(&self) -> Result<Arc<StationSnapshot>, FeedError> {
        info!(url = self.client.url(), "refreshing stations from feed");
        let feed = self.client.fetch().await?;

        if let Some(result) = feed.result.as_deref() {
            if result != "OK" {
                warn!(result, "feed reported a non-OK result");
            }
        }

        let total = feed.stations.len();
        let stations = normalize(feed.stations, &self.config.brand);
        info!(
            total,
            kept = stations.len(),
            brand = self.config.brand.brand(),
            "normalized station feed"
        );

        let entry = CacheEntry::new(stations, feed.published_at, Utc::now());
        if let Err(e) = self.cache.set(&entry) {
            warn!(error = %e, "failed to write station cache");
        }

        let snapshot = Arc::new(StationSnapshot::from_entry(entry, DataSource::Network));
        self.install(Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    async fn fall_back(&self, error: &FeedError) -> RefreshOutcome {
        warn!(error = %error, status = ?error.status(), "station feed refresh failed");

        match self.read_cache() {
            Some(entry) => {
                let source = if entry.is_fresh(Utc::now(), self.config.ttl) {
                    DataSource::Cache
                } else {
                    DataSource::StaleCache
                };
                let snapshot = StationSnapshot::from_entry(entry, source);
                let stations = snapshot.len();
                warn!(stations, ?source, "using cached stations as fallback");
                self.install(Arc::new(snapshot)).await;
                RefreshOutcome::FellBack {
                    stations,
                    error: error.to_string(),
                }
            }
            None => {
                let current = self.snapshot().await;
                let failed = StationSnapshot {
                    notice: Some(LOAD_FAILURE_NOTICE.to_string()),
                    ..(*current).clone()
                };
                self.install(Arc::new(failed)).await;
                RefreshOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    /// Read the cache slot. A corrupt entry is deleted and treated as absent.
    fn read_cache(&self) -> Option<CacheEntry> {
        match self.cache.get() {
            Ok(entry) => entry,
            Err(CacheError::Corrupt(reason)) => {
                warn!(%reason, "discarding corrupt station cache");
                if let Err(e) = self.cache.invalidate() {
                    warn!(error = %e, "failed to clear corrupt station cache");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to read station cache");
                None
            }
        }
    }

    async fn install(&self, snapshot: Arc<StationSnapshot>) {
        let mut guard = self.snapshot.write().await;
        *guard = snapshot;
    }
}
