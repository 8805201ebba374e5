//! Configuration loading and validation for the interception layer.
//!
//! All values are read from environment variables. Key material must be
//! supplied either as a base64-encoded key (`CRYPT_KEY`) or as a passphrase
//! (`CRYPT_KEY_PASSPHRASE`); loading fails with a clear error message when
//! neither is present or the key is malformed.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::{AesGcmSivCipher, KeyBytes};

/// Validated interception-layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Standard-base64-encoded 32-byte key for the default cipher provider.
    #[serde(default)]
    pub crypt_key: String,

    /// Passphrase the key is derived from when `crypt_key` is unset.
    #[serde(default)]
    pub crypt_key_passphrase: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`). The library never
    /// installs a subscriber; this is advisory for the embedding application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if no key material is configured or if `CRYPT_KEY`
    /// cannot be decoded into a 32-byte key.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.crypt_key.trim().is_empty() && self.crypt_key_passphrase.trim().is_empty() {
            anyhow::bail!("one of CRYPT_KEY or CRYPT_KEY_PASSPHRASE is required");
        }
        if !self.crypt_key.trim().is_empty() {
            KeyBytes::from_base64(&self.crypt_key)
                .context("CRYPT_KEY must be standard base64 of exactly 32 bytes")?;
        }
        Ok(())
    }

    /// Build the default cipher provider from the configured key material.
    ///
    /// `crypt_key` takes precedence over the passphrase.
    ///
    /// # Errors
    ///
    /// Returns an error if `crypt_key` cannot be decoded.
    pub fn cipher(&self) -> Result<AesGcmSivCipher> {
        if !self.crypt_key.trim().is_empty() {
            let key = KeyBytes::from_base64(&self.crypt_key)
                .context("CRYPT_KEY must be standard base64 of exactly 32 bytes")?;
            return Ok(AesGcmSivCipher::new(key));
        }
        Ok(AesGcmSivCipher::from_passphrase(&self.crypt_key_passphrase))
    }
}
