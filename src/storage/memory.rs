//! In-process cache with per-key expiry.

use super::CacheStore;
use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stored value plus its absolute expiry.
#[derive(Clone, Debug)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(key: &str, value: &str, ttl: Duration) -> StorageResult<Self> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            StorageError::InvalidValue(format!(
                "TTL for '{}' overflows the clock: {}s",
                key,
                ttl.num_seconds()
            ))
        })?;
        Ok(Self {
            value: value.to_string(),
            expires_at,
        })
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Expiring cache backed by a [`DashMap`].
///
/// Expired entries read as absent and are dropped lazily on access; call
/// [`MemoryCache::cleanup_expired`] (or spawn [`run_cache_cleanup`]) to purge
/// entries nobody touches again. State is per-process, so multi-instance
/// deployments need a shared backend instead.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Drop every entry whose TTL has elapsed.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

fn validate_ttl(key: &str, ttl: Duration) -> StorageResult<()> {
    if ttl <= Duration::zero() {
        return Err(StorageError::InvalidValue(format!(
            "TTL for '{}' must be positive, got {}s",
            key,
            ttl.num_seconds()
        )));
    }
    Ok(())
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // Expired: only remove if nobody rewrote it in the meantime
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()> {
        validate_ttl(key, ttl)?;
        let entry = CacheEntry::new(key, value, ttl)?;
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    /// Atomic: the shard lock is held across the check and the write.
    fn check_and_set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<bool> {
        validate_ttl(key, ttl)?;
        let entry = CacheEntry::new(key, value, ttl)?;
        let now = Utc::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let existed = occupied.get().is_live(now);
                occupied.insert(entry);
                Ok(existed)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(false)
            }
        }
    }
}

/// Background task to periodically purge expired cache entries
///
/// An `interval_seconds` of zero is raised to one second.
pub async fn run_cache_cleanup(cache: Arc<MemoryCache>, interval_seconds: u64) {
    let interval_seconds = if interval_seconds == 0 {
        warn!("Cache cleanup interval of 0s is invalid, using 1s");
        1
    } else {
        interval_seconds
    };
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        cache.cleanup_expired();
        debug!("Cache cleanup complete, {} entries remaining", cache.count());
    }
}
