use crate::error::StorageResult;
use anyhow::{Context, Result};
use serde::Deserialize;

// Re-export per-module config types
pub use crate::nonce::NonceConfig;
pub use crate::temporary::TemporaryCredentialConfig;

/// Complete OAuth1 cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Oauth1CacheConfig {
    #[serde(default)]
    pub temporary_credential: TemporaryCredentialConfig,
    #[serde(default)]
    pub nonce: NonceConfig,
}

impl Oauth1CacheConfig {
    /// Check that every TTL is positive and within range.
    pub fn validate(&self) -> StorageResult<()> {
        self.temporary_credential.ttl()?;
        self.nonce.expires()?;
        Ok(())
    }
}

/// Load and validate configuration from TOML file
pub fn load_config(path: &str) -> Result<Oauth1CacheConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: Oauth1CacheConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Oauth1CacheConfig::default();
        assert_eq!(config.temporary_credential.key_prefix, "temporary_credential:");
        assert_eq!(config.temporary_credential.ttl_seconds, 86400);
        assert!(!config.temporary_credential.reject_duplicate_tokens);
        assert_eq!(config.nonce.key_prefix, "nonce:");
        assert_eq!(config.nonce.expires_seconds, 300);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [temporary_credential]
            key_prefix = "oauth1:tc:"
            ttl_seconds = 3600
            reject_duplicate_tokens = true

            [nonce]
            key_prefix = "oauth1:nonce:"
            expires_seconds = 600
        "#;

        let config: Oauth1CacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.temporary_credential.key_prefix, "oauth1:tc:");
        assert_eq!(config.temporary_credential.ttl_seconds, 3600);
        assert!(config.temporary_credential.reject_duplicate_tokens);
        assert_eq!(config.nonce.key_prefix, "oauth1:nonce:");
        assert_eq!(config.nonce.expires_seconds, 600);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections and fields use defaults
        let toml = r#"
            [nonce]
            expires_seconds = 120
        "#;

        let config: Oauth1CacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.nonce.expires_seconds, 120);
        assert_eq!(config.nonce.key_prefix, "nonce:"); // Default
        assert_eq!(config.temporary_credential.ttl_seconds, 86400); // Default
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[temporary_credential]\nttl_seconds = 60").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.temporary_credential.ttl_seconds, 60);
    }

    fn load_from_str(contents: &str) -> Result<Oauth1CacheConfig> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        load_config(file.path().to_str().unwrap())
    }

    #[test]
    fn test_load_config_rejects_non_positive_ttls() {
        for contents in [
            "[temporary_credential]\nttl_seconds = 0",
            "[temporary_credential]\nttl_seconds = -60",
            "[nonce]\nexpires_seconds = 0",
            "[nonce]\nexpires_seconds = -300",
        ] {
            let err = load_from_str(contents).unwrap_err();
            assert!(
                format!("{:#}", err).contains("must be between 1 and"),
                "accepted: {}",
                contents
            );
        }
    }

    #[test]
    fn test_load_config_rejects_overflowing_ttls() {
        for contents in [
            "[temporary_credential]\nttl_seconds = 10000000000000",
            "[nonce]\nexpires_seconds = 9223372036854775807",
        ] {
            let err = load_from_str(contents).unwrap_err();
            assert!(err.to_string().contains("Invalid config file"), "accepted: {}", contents);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Oauth1CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/oauth1-cache.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[nonce\nexpires_seconds = ").unwrap();

        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
