//! Cache for features resolved from the registry
//!
//! The cache layer uses a trait hierarchy:
//!
//! - **ReadCache**: For read-only cache operations
//! - **WriteCache**: Extends ReadCache with write operations
//!
//! Keys combine the crate name with the normalised version requirement, or
//! the literal `latest` when none was written (see [`cache_key`]). Entries
//! live for the whole process: [`DEFAULT_TTL`] is `None`, nothing is
//! evicted and nothing is written to disk. Features of path dependencies
//! never go through this cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::features::FeatureInfo;
use crate::registries::version_utils::normalize_requirement;

/// Lifetime of a cache entry. `None` means entries never expire.
pub const DEFAULT_TTL: Option<Duration> = None;

/// Version component of a key when the manifest gives no requirement
pub const LATEST: &str = "latest";

/// Cache key for `crate_name` at `requirement`, e.g. `serde@1.0` or
/// `serde@latest`
pub fn cache_key(crate_name: &str, requirement: Option<&str>) -> String {
    let version = requirement
        .map(normalize_requirement)
        .filter(|v| !v.is_empty())
        .unwrap_or(LATEST);
    format!("{crate_name}@{version}")
}

/// Trait for read-only cache operations
pub trait ReadCache: Send + Sync {
    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or the entry is expired.
    fn get(&self, key: &str) -> Option<Vec<FeatureInfo>>;

    /// Check if a key exists in the cache (without fetching the value)
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Trait for writeable cache operations
pub trait WriteCache: ReadCache {
    /// Insert a value into the cache
    ///
    /// If a value with the same key already exists, it will be overwritten.
    fn insert(&self, key: String, value: Vec<FeatureInfo>);
}

impl<T: ReadCache> ReadCache for Arc<T> {
    fn get(&self, key: &str) -> Option<Vec<FeatureInfo>> {
        (**self).get(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

impl<T: WriteCache> WriteCache for Arc<T> {
    fn insert(&self, key: String, value: Vec<FeatureInfo>) {
        (**self).insert(key, value)
    }
}

/// Cache entry with optional expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<FeatureInfo>,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|ttl| self.inserted_at.elapsed() > ttl)
    }
}

/// In-memory cache using DashMap for thread-safety.
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create a new cache with the process-lifetime policy
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: DEFAULT_TTL,
        }
    }

    /// Number of cached crates/version pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create a new cache with custom TTL
    #[cfg(test)]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: Some(ttl),
        }
    }
}

impl ReadCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<FeatureInfo>> {
        self.entries.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.data.clone())
            }
        })
    }
}

impl WriteCache for MemoryCache {
    fn insert(&self, key: String, value: Vec<FeatureInfo>) {
        self.entries.insert(
            key,
            CacheEntry {
                data: value,
                inserted_at: Instant::now(),
                ttl: self.ttl,
            },
        );
    }
}
