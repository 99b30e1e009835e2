//! Expiring key-value cache contract.
//!
//! Both the temporary credential manager and the nonce ledger are stateless;
//! every piece of shared state lives behind a [`CacheStore`].
//!
//! # Contract
//!
//! ```text
//! get(key)                    -> Option<value>   (expired == absent)
//! set(key, value, ttl)                            (last write wins, TTL restarts)
//! delete(key)                                     (idempotent)
//! has(key)                    -> bool
//! check_and_set(key, v, ttl)  -> bool            (was it live before the write?)
//! ```
//!
//! Values are strings: JSON for credential records, a sentinel for nonces.
//! Backends for shared caches (Redis, memcached, ...) are provided by the
//! embedding server; [`MemoryCache`] covers tests and single-process use.

use crate::error::{StorageError, StorageResult};
use chrono::Duration;

mod memory;

pub use memory::{run_cache_cleanup, MemoryCache};

/// Longest TTL accepted from configuration (ten years).
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Convert a configured TTL into a [`Duration`], rejecting values that are
/// not in `1..=MAX_TTL_SECONDS`.
pub fn ttl_from_seconds(field: &str, seconds: i64) -> StorageResult<Duration> {
    if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
        return Err(StorageError::InvalidValue(format!(
            "{} must be between 1 and {} seconds, got {}",
            field, MAX_TTL_SECONDS, seconds
        )));
    }
    Duration::try_seconds(seconds).ok_or_else(|| {
        StorageError::InvalidValue(format!("{} out of range: {}", field, seconds))
    })
}

/// Expiring key-value store backing credentials and nonces.
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, or `None` if missing or expired.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, expiring `ttl` from now.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether a live value exists for `key`.
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Writes `value` under `key` unconditionally and reports whether a live
    /// value was present beforehand.
    ///
    /// The default is a presence check followed by a write, so two concurrent
    /// callers can both observe `false`. Backends that can hold a lock across
    /// both steps should override it.
    fn check_and_set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<bool> {
        let existed = self.has(key)?;
        self.set(key, value, ttl)?;
        Ok(existed)
    }
}
