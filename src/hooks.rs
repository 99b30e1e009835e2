//! Handler wiring for the authorization server.
//!
//! The server holds one typed handle per hook group, assigned once at
//! construction. Hook names map to trait methods:
//!
//! | Hook | Handler |
//! |---|---|
//! | `create_temporary_credential` | [`TemporaryCredentialHooks`] |
//! | `get_temporary_credential` | [`TemporaryCredentialHooks`] |
//! | `delete_temporary_credential` | [`TemporaryCredentialHooks`] |
//! | `create_authorization_verifier` | [`TemporaryCredentialHooks`] |
//! | `exists_nonce` | [`NonceHooks`] |

use crate::config::Oauth1CacheConfig;
use crate::error::StorageResult;
use crate::nonce::{NonceHooks, NonceLedger};
use crate::storage::CacheStore;
use crate::temporary::{TemporaryCredentialHooks, TemporaryCredentialManager};
use std::sync::Arc;
use tracing::info;

/// Shared hook handlers for an OAuth1 authorization server
#[derive(Clone)]
pub struct AuthorizationHooks {
    pub temporary_credentials: Arc<dyn TemporaryCredentialHooks>,
    pub nonces: Arc<dyn NonceHooks>,
}

impl AuthorizationHooks {
    /// Use custom handlers.
    pub fn new(
        temporary_credentials: Arc<dyn TemporaryCredentialHooks>,
        nonces: Arc<dyn NonceHooks>,
    ) -> Self {
        Self {
            temporary_credentials,
            nonces,
        }
    }

    /// Cache-backed handlers for all five hooks, sharing one cache.
    ///
    /// Fails if either configured TTL is out of range.
    pub fn from_cache(
        cache: Arc<dyn CacheStore>,
        config: &Oauth1CacheConfig,
    ) -> StorageResult<Self> {
        let temporary_credentials =
            TemporaryCredentialManager::new(cache.clone(), &config.temporary_credential)?;
        let nonces = NonceLedger::new(cache, &config.nonce)?;

        info!(
            credential_prefix = %config.temporary_credential.key_prefix,
            credential_ttl_seconds = config.temporary_credential.ttl_seconds,
            nonce_prefix = %config.nonce.key_prefix,
            nonce_expires_seconds = config.nonce.expires_seconds,
            "OAuth1 cache hooks initialized"
        );

        Ok(Self::new(Arc::new(temporary_credentials), Arc::new(nonces)))
    }
}
