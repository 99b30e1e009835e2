//! Temporary credential lifecycle backed by the cache.
//!
//! Drives a credential through Issued → Granted → Consumed. Every mutating
//! operation is exactly one cache write or delete; nothing is cached in
//! process, so any number of server instances can share one backend.

use crate::credential::{GrantUser, TemporaryCredential, TemporaryCredentialLike, TemporaryToken};
use crate::error::{StorageError, StorageResult};
use crate::storage::{ttl_from_seconds, CacheStore};
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Temporary credential configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TemporaryCredentialConfig {
    /// Prefix prepended to `oauth_token` to form the cache key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Lifetime of a credential after its last write (seconds)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,
    /// Refuse to issue a token whose key is already live instead of overwriting it
    #[serde(default)]
    pub reject_duplicate_tokens: bool,
}

fn default_key_prefix() -> String {
    "temporary_credential:".to_string()
}

fn default_ttl_seconds() -> i64 {
    86400 // one day
}

impl TemporaryCredentialConfig {
    /// Validated credential lifetime.
    pub fn ttl(&self) -> StorageResult<Duration> {
        ttl_from_seconds("temporary_credential.ttl_seconds", self.ttl_seconds)
    }
}

impl Default for TemporaryCredentialConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            ttl_seconds: default_ttl_seconds(),
            reject_duplicate_tokens: false,
        }
    }
}

/// Hook surface the authorization server calls at each step of the flow.
pub trait TemporaryCredentialHooks: Send + Sync {
    /// Issue and persist a new credential for `client_id`.
    fn create_temporary_credential(
        &self,
        token: TemporaryToken,
        client_id: &str,
        redirect_uri: Option<&str>,
    ) -> StorageResult<TemporaryCredential>;

    /// Look up a live credential. `None`/empty tokens short-circuit to `Ok(None)`.
    fn get_temporary_credential(
        &self,
        oauth_token: Option<&str>,
    ) -> StorageResult<Option<TemporaryCredential>>;

    /// Remove a credential. `None`/empty tokens and missing keys are no-ops.
    fn delete_temporary_credential(&self, oauth_token: Option<&str>) -> StorageResult<()>;

    /// Bind an approved credential to the granting user and verifier.
    ///
    /// The caller must already have authenticated `grant_user` and fetched
    /// `credential`; no re-validation happens here.
    fn create_authorization_verifier(
        &self,
        credential: TemporaryCredential,
        grant_user: &dyn GrantUser,
        verifier: &str,
    ) -> StorageResult<TemporaryCredential>;
}

/// Cache-backed temporary credential manager
#[derive(Clone)]
pub struct TemporaryCredentialManager {
    cache: Arc<dyn CacheStore>,
    key_prefix: String,
    ttl: Duration,
    reject_duplicate_tokens: bool,
}

impl TemporaryCredentialManager {
    /// Fails if the configured TTL is not positive or too large.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        config: &TemporaryCredentialConfig,
    ) -> StorageResult<Self> {
        Ok(Self {
            cache,
            key_prefix: config.key_prefix.clone(),
            ttl: config.ttl()?,
            reject_duplicate_tokens: config.reject_duplicate_tokens,
        })
    }

    fn key(&self, oauth_token: &str) -> String {
        format!("{}{}", self.key_prefix, oauth_token)
    }

    fn persist(&self, key: &str, credential: &TemporaryCredential) -> StorageResult<()> {
        let value = credential.to_stored()?;
        debug!(key = %key, ttl_seconds = self.ttl.num_seconds(), "Writing temporary credential");
        self.cache.set(key, &value, self.ttl)
    }
}

fn non_empty(oauth_token: Option<&str>) -> Option<&str> {
    oauth_token.filter(|t| !t.is_empty())
}

impl TemporaryCredentialHooks for TemporaryCredentialManager {
    fn create_temporary_credential(
        &self,
        token: TemporaryToken,
        client_id: &str,
        redirect_uri: Option<&str>,
    ) -> StorageResult<TemporaryCredential> {
        if token.oauth_token.is_empty() {
            return Err(StorageError::InvalidKey(
                "oauth_token must not be empty".to_string(),
            ));
        }

        let key = self.key(&token.oauth_token);

        // Extra round-trip, only when issuance uniqueness is required
        if self.reject_duplicate_tokens && self.cache.has(&key)? {
            warn!(
                key = %key,
                client_id = %client_id,
                "Refusing to overwrite live temporary credential"
            );
            return Err(StorageError::KeyExists(key));
        }

        let credential = TemporaryCredential::issue(token, client_id, redirect_uri);
        self.persist(&key, &credential)?;

        info!(
            oauth_token = %credential.get_oauth_token(),
            client_id = %client_id,
            has_callback = credential.get_redirect_uri().is_some(),
            "Temporary credential issued"
        );

        Ok(credential)
    }

    fn get_temporary_credential(
        &self,
        oauth_token: Option<&str>,
    ) -> StorageResult<Option<TemporaryCredential>> {
        let Some(oauth_token) = non_empty(oauth_token) else {
            return Ok(None);
        };

        let key = self.key(oauth_token);
        debug!(key = %key, "Looking up temporary credential");

        let Some(value) = self.cache.get(&key)? else {
            debug!(key = %key, "Temporary credential not found or expired");
            return Ok(None);
        };

        TemporaryCredential::from_stored(&key, &value)
            .map(Some)
            .inspect_err(|e| {
                warn!(key = %key, error = %e, "Stored temporary credential is corrupt");
            })
    }

    fn delete_temporary_credential(&self, oauth_token: Option<&str>) -> StorageResult<()> {
        let Some(oauth_token) = non_empty(oauth_token) else {
            return Ok(());
        };

        let key = self.key(oauth_token);
        debug!(key = %key, "Deleting temporary credential");
        self.cache.delete(&key)
    }

    fn create_authorization_verifier(
        &self,
        mut credential: TemporaryCredential,
        grant_user: &dyn GrantUser,
        verifier: &str,
    ) -> StorageResult<TemporaryCredential> {
        if verifier.is_empty() {
            return Err(StorageError::InvalidValue(
                "verifier must not be empty".to_string(),
            ));
        }

        let key = self.key(credential.get_oauth_token());
        if credential.is_granted() {
            warn!(key = %key, "Temporary credential already carries a verifier");
            return Err(StorageError::InvalidValue(format!(
                "temporary credential at '{}' is already granted",
                key
            )));
        }

        let user_id = grant_user.get_user_id();
        credential.grant(user_id, verifier);
        self.persist(&key, &credential)?;

        info!(
            oauth_token = %credential.get_oauth_token(),
            client_id = %credential.get_client_id(),
            user_id = ?credential.get_user_id(),
            "Authorization verifier attached"
        );

        Ok(credential)
    }
}
