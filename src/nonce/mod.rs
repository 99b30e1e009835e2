//! Nonce ledger for replay detection.
//!
//! Every signed request carries a `(nonce, timestamp, client, token)` tuple.
//! The ledger remembers each tuple for a fixed window; a tuple seen again
//! inside that window is a replay. Requests older than the window are
//! rejected upstream by the timestamp freshness check, so forgetting them
//! is safe and keeps the ledger bounded.
//!
//! # Key layout
//!
//! ```text
//! {prefix}{nonce}-{timestamp}-{client_id}[-{oauth_token}]
//! ```

use crate::error::StorageResult;
use crate::storage::{ttl_from_seconds, CacheStore};
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value stored under a nonce key; only presence matters.
const NONCE_SENTINEL: &str = "1";

/// Nonce ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NonceConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Replay window (seconds)
    #[serde(default = "default_expires_seconds")]
    pub expires_seconds: i64,
}

fn default_key_prefix() -> String {
    "nonce:".to_string()
}

fn default_expires_seconds() -> i64 {
    300
}

impl NonceConfig {
    /// Validated replay window.
    pub fn expires(&self) -> StorageResult<Duration> {
        ttl_from_seconds("nonce.expires_seconds", self.expires_seconds)
    }
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            expires_seconds: default_expires_seconds(),
        }
    }
}

/// Hook the signature verifier calls once per signed request.
pub trait NonceHooks: Send + Sync {
    /// Returns true if the tuple was already recorded inside the window.
    /// The tuple is recorded (and its window restarted) either way.
    fn exists_nonce(
        &self,
        nonce: &str,
        timestamp: &str,
        client_id: &str,
        oauth_token: Option<&str>,
    ) -> StorageResult<bool>;
}

/// Build the cache key for a nonce tuple. The token segment is omitted when
/// `oauth_token` is `None` or empty.
pub fn nonce_key(
    prefix: &str,
    nonce: &str,
    timestamp: &str,
    client_id: &str,
    oauth_token: Option<&str>,
) -> String {
    match oauth_token.filter(|t| !t.is_empty()) {
        Some(token) => format!("{}{}-{}-{}-{}", prefix, nonce, timestamp, client_id, token),
        None => format!("{}{}-{}-{}", prefix, nonce, timestamp, client_id),
    }
}

/// Cache-backed nonce ledger
#[derive(Clone)]
pub struct NonceLedger {
    cache: Arc<dyn CacheStore>,
    key_prefix: String,
    expires: Duration,
}

impl NonceLedger {
    /// Fails if the configured window is not positive or too large.
    pub fn new(cache: Arc<dyn CacheStore>, config: &NonceConfig) -> StorageResult<Self> {
        Ok(Self {
            cache,
            key_prefix: config.key_prefix.clone(),
            expires: config.expires()?,
        })
    }
}

impl NonceHooks for NonceLedger {
    fn exists_nonce(
        &self,
        nonce: &str,
        timestamp: &str,
        client_id: &str,
        oauth_token: Option<&str>,
    ) -> StorageResult<bool> {
        let key = nonce_key(&self.key_prefix, nonce, timestamp, client_id, oauth_token);

        // Atomic only if the backend overrides check_and_set
        let seen = self.cache.check_and_set(&key, NONCE_SENTINEL, self.expires)?;

        if seen {
            warn!(
                nonce = %nonce,
                timestamp = %timestamp,
                client_id = %client_id,
                "Nonce replay detected"
            );
        } else {
            debug!(key = %key, "Nonce recorded");
        }

        Ok(seen)
    }
}
