// Cache error taxonomy
pub mod error;

// Expiring key-value cache contract and in-memory backend
pub mod storage;

// Temporary credential record
pub mod credential;

// Temporary credential lifecycle (issue, grant, consume)
pub mod temporary;

// Nonce replay ledger
pub mod nonce;

// Handler wiring for the authorization server
pub mod hooks;

// Configuration
pub mod config;

pub use credential::{
    generate_verifier, GrantUser, TemporaryCredential, TemporaryCredentialLike, TemporaryToken,
};
pub use error::{StorageError, StorageResult};
pub use hooks::AuthorizationHooks;
pub use nonce::{NonceHooks, NonceLedger};
pub use storage::{CacheStore, MemoryCache};
pub use temporary::{TemporaryCredentialHooks, TemporaryCredentialManager};
