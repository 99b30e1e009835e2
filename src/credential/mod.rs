//! Temporary credential record for the OAuth 1.0a three-legged flow.
//!
//! A temporary credential (the "request token") is issued to a client before
//! the resource owner authorizes it, then bound to that owner through a
//! verifier and finally exchanged for an access token.
//!
//! # Lifecycle
//!
//! ```text
//!   Issued ──grant(user, verifier)──▶ Granted ──delete──▶ Consumed
//!     │                                  │
//!     └──────── TTL elapses ─────────────┴──▶ (absent)
//! ```
//!
//! The record itself carries no expiry; the cache is the sole authority on
//! whether it is still alive.
//!
//! # Stored form
//!
//! ```json
//! {
//!   "oauth_token": "...",
//!   "oauth_token_secret": "...",
//!   "oauth_consumer_key": "client-id",
//!   "oauth_callback": "https://client.example/cb",
//!   "oauth_verifier": "...",
//!   "user_id": "..."
//! }
//! ```

use crate::error::{StorageError, StorageResult};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Length of generated token secrets.
const SECRET_LENGTH: usize = 40;

/// Length of generated authorization verifiers.
const VERIFIER_LENGTH: usize = 30;

/// Capability set the signature-verification layer needs from a temporary
/// credential.
///
/// All accessors are pure reads and never fail; unset optional fields come
/// back as `None`.
pub trait TemporaryCredentialLike {
    fn get_client_id(&self) -> &str;

    fn get_redirect_uri(&self) -> Option<&str>;

    fn get_user_id(&self) -> Option<&str>;

    /// True iff `verifier` matches the stored verifier exactly.
    ///
    /// Returns false when no verifier has been attached yet or when
    /// `verifier` is empty.
    fn check_verifier(&self, verifier: &str) -> bool;

    fn get_oauth_token(&self) -> &str;

    fn get_oauth_token_secret(&self) -> &str;
}

/// The resource owner who approved an authorization request.
pub trait GrantUser {
    fn get_user_id(&self) -> String;
}

/// Token pair handed to the temporary credential manager at issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryToken {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl TemporaryToken {
    /// Wrap an existing token pair. The token must be non-empty since it is
    /// the lookup key for the credential.
    pub fn new(
        oauth_token: impl Into<String>,
        oauth_token_secret: impl Into<String>,
    ) -> StorageResult<Self> {
        let oauth_token = oauth_token.into();
        if oauth_token.is_empty() {
            return Err(StorageError::InvalidKey(
                "oauth_token must not be empty".to_string(),
            ));
        }
        Ok(Self {
            oauth_token,
            oauth_token_secret: oauth_token_secret.into(),
        })
    }

    /// Generate a fresh token pair: UUID v4 token, random alphanumeric secret.
    pub fn generate() -> Self {
        Self {
            oauth_token: Uuid::new_v4().simple().to_string(),
            oauth_token_secret: random_alphanumeric(SECRET_LENGTH),
        }
    }
}

/// Generate a random authorization verifier.
pub fn generate_verifier() -> String {
    random_alphanumeric(VERIFIER_LENGTH)
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Materialized view of a stored temporary credential.
///
/// Serialized with the OAuth parameter names so the stored value mirrors the
/// protocol vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryCredential {
    oauth_token: String,

    oauth_token_secret: String,

    /// Requesting client (`oauth_consumer_key`), fixed at issuance
    #[serde(rename = "oauth_consumer_key")]
    client_id: String,

    /// Client callback (`oauth_callback`), fixed at issuance
    #[serde(
        rename = "oauth_callback",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    redirect_uri: Option<String>,

    /// Set together with `user_id` when the resource owner approves
    #[serde(
        rename = "oauth_verifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    verifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl TemporaryCredential {
    /// Build a freshly issued credential. An empty `redirect_uri` is treated
    /// as not supplied.
    pub fn issue(token: TemporaryToken, client_id: &str, redirect_uri: Option<&str>) -> Self {
        Self {
            oauth_token: token.oauth_token,
            oauth_token_secret: token.oauth_token_secret,
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri
                .filter(|uri| !uri.is_empty())
                .map(str::to_string),
            verifier: None,
            user_id: None,
        }
    }

    /// Attach the verifier and granting user in one step.
    pub(crate) fn grant(&mut self, user_id: String, verifier: &str) {
        self.verifier = Some(verifier.to_string());
        self.user_id = Some(user_id);
    }

    /// Whether the resource owner has approved this credential.
    pub fn is_granted(&self) -> bool {
        self.verifier.is_some()
    }

    /// Serialize for storage.
    pub fn to_stored(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Materialize a stored value read from `key`, rejecting records that
    /// break the credential invariants.
    pub fn from_stored(key: &str, value: &str) -> StorageResult<Self> {
        let credential: Self = serde_json::from_str(value).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        if credential.oauth_token.is_empty() {
            return Err(StorageError::Corrupt {
                key: key.to_string(),
                reason: "empty oauth_token".to_string(),
            });
        }
        if credential.verifier.is_some() != credential.user_id.is_some() {
            return Err(StorageError::Corrupt {
                key: key.to_string(),
                reason: "oauth_verifier and user_id must be set together".to_string(),
            });
        }

        Ok(credential)
    }
}

impl TemporaryCredentialLike for TemporaryCredential {
    fn get_client_id(&self) -> &str {
        &self.client_id
    }

    fn get_redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    fn get_user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn check_verifier(&self, verifier: &str) -> bool {
        match self.verifier.as_deref() {
            Some(stored) if !verifier.is_empty() => {
                stored.as_bytes().ct_eq(verifier.as_bytes()).into()
            }
            _ => false,
        }
    }

    fn get_oauth_token(&self) -> &str {
        &self.oauth_token
    }

    fn get_oauth_token_secret(&self) -> &str {
        &self.oauth_token_secret
    }
}
