//! Single-slot local cache for the station list.
//!
//! The cache holds exactly one entry: the normalized stations from the last
//! successful fetch plus the time they were fetched. Writes replace the
//! entry wholesale. Freshness is decided by the reader, so an expired entry
//! stays available as a fallback until it is overwritten.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::StationRecord;

/// Default freshness window: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default cache file, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "fuel_cache.json";

/// The cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData {
    pub stations: Vec<StationRecord>,
    /// The feed's own publication timestamp, when it reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// A timestamped snapshot of the last successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry was written, in Unix epoch milliseconds.
    pub timestamp: i64,
    pub data: CachedData,
}

impl CacheEntry {
    /// Create an entry stamped with `now`.
    pub fn new(
        stations: Vec<StationRecord>,
        published_at: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: now.timestamp_millis(),
            data: CachedData {
                stations,
                published_at,
            },
        }
    }

    /// When the entry was written.
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Age of the entry at `now`. Negative if the entry is from the future.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        chrono::Duration::milliseconds(now.timestamp_millis().saturating_sub(self.timestamp))
    }

    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age(now).num_milliseconds() < ttl_millis
    }
}

/// Errors from cache backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store could not be read or written.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored entry is not a valid cache entry.
    #[error("corrupt cache entry: {0}")]
    Corrupt(String),

    /// The entry could not be encoded.
    #[error("failed to serialize cache entry: {0}")]
    Serialize(String),
}

/// A single-slot store for the station cache entry.
pub trait CacheRepository: Send + Sync + fmt::Debug {
    /// Read the entry, if any. Returns `CacheError::Corrupt` for malformed data.
    fn get(&self) -> Result<Option<CacheEntry>, CacheError>;

    /// Replace the entry.
    fn set(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Remove the entry. Removing an absent entry is not an error.
    fn invalidate(&self) -> Result<(), CacheError>;
}

fn decode(raw: &str) -> Result<CacheEntry, CacheError> {
    serde_json::from_str(raw).map_err(|e| CacheError::Corrupt(e.to_string()))
}

fn encode(entry: &CacheEntry) -> Result<String, CacheError> {
    serde_json::to_string(entry).map_err(|e| CacheError::Serialize(e.to_string()))
}

/// Cache entry stored as a JSON file.
#[derive(Debug, Clone)]
pub struct DiskCache {
    path: PathBuf,
}

impl DiskCache {
    /// Create a disk cache at `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DiskCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PATH)
    }
}

impl CacheRepository for DiskCache {
    fn get(&self) -> Result<Option<CacheEntry>, CacheError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&contents).map(Some)
    }

    /// Creates parent directories if they don't exist.
    fn set(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = encode(entry)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn invalidate(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory cache slot holding the encoded entry.
///
/// Stores the serialized form so tests can plant malformed data.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose slot already holds `raw`, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Whether the slot is occupied.
    pub fn is_occupied(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl CacheRepository for MemoryCache {
    fn get(&self) -> Result<Option<CacheEntry>, CacheError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_deref().map(decode).transpose()
    }

    fn set(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let json = encode(entry)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn invalidate(&self) -> Result<(), CacheError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use tempfile::tempdir;

    fn stations() -> Vec<StationRecord> {
        vec![StationRecord {
            id: Some("4375".to_string()),
            label: "BP EL PLANTIO".to_string(),
            address: "AVENIDA ISABEL DE SANTO DOMINGO, 11".to_string(),
            municipality: Some("Madrid".to_string()),
            postal_code: None,
            province: "MADRID".to_string(),
            latitude: "40.466083".to_string(),
            longitude: "-3.818083".to_string(),
            hours: "L-D: 24H".to_string(),
            prices: BTreeMap::new(),
        }]
    }

    #[test]
    fn save_and_load_cache() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache.json"));
        let entry = CacheEntry::new(stations(), Some("16/10/2026".to_string()), Utc::now());

        cache.set(&entry).unwrap();

        let loaded = cache.get().unwrap().unwrap();
        assert_eq!(loaded, entry);
        assert_eq!(loaded.data.stations[0].label, "BP EL PLANTIO");
    }

    #[test]
    fn stale_entry_is_not_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::new(stations(), None, now - chrono::Duration::hours(25));
        assert!(!entry.is_fresh(now, DEFAULT_TTL));

        let entry = CacheEntry::new(stations(), None, now - chrono::Duration::hours(23));
        assert!(entry.is_fresh(now, DEFAULT_TTL));
    }

    #[test]
    fn exactly_ttl_old_is_stale() {
        let now = Utc::now();
        let entry = CacheEntry::new(stations(), None, now - chrono::Duration::hours(24));
        assert!(!entry.is_fresh(now, DEFAULT_TTL));
    }

    #[test]
    fn missing_cache_returns_none() {
        let cache = DiskCache::new("/nonexistent/path/cache.json");
        assert!(cache.get().unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"timestamp": "yesterday"}"#).unwrap();

        let cache = DiskCache::new(&path);
        assert!(matches!(cache.get(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn invalidate_removes_file_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = DiskCache::new(&path);

        cache
            .set(&CacheEntry::new(stations(), None, Utc::now()))
            .unwrap();
        assert!(path.exists());

        cache.invalidate().unwrap();
        assert!(!path.exists());
        cache.invalidate().unwrap();
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("cache.json");
        let cache = DiskCache::new(&path);

        cache
            .set(&CacheEntry::new(stations(), None, Utc::now()))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn last_write_wins() {
        let cache = MemoryCache::new();
        let first = CacheEntry::new(stations(), Some("first".to_string()), Utc::now());
        let second = CacheEntry::new(Vec::new(), Some("second".to_string()), Utc::now());

        cache.set(&first).unwrap();
        cache.set(&second).unwrap();

        let loaded = cache.get().unwrap().unwrap();
        assert_eq!(loaded.data.published_at.as_deref(), Some("second"));
        assert!(loaded.data.stations.is_empty());
    }

    #[test]
    fn memory_cache_reports_corruption() {
        let cache = MemoryCache::with_raw("not json");
        assert!(matches!(cache.get(), Err(CacheError::Corrupt(_))));

        cache.invalidate().unwrap();
        assert!(!cache.is_occupied());
        assert!(cache.get().unwrap().is_none());
    }
}
