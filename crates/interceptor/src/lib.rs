//! `fieldcrypt` — transparent field-level crypto between application code and
//! a data-access pipeline.
//!
//! Application code declares which operation parameters, results, and record
//! fields carry sensitive strings; the interceptor encrypts them on the way
//! into storage and decrypts them on the way out. Calling code never handles
//! ciphertext directly.
//!
//! Usage sequence:
//! 1. Build a [`MapperRegistry`] from your operation declarations (or a JSON
//!    manifest).
//! 2. Build a cipher provider — [`AesGcmSivCipher`] from [`Config::from_env`],
//!    a key, or a passphrase — or bring your own [`StringCipher`].
//! 3. Wrap your [`Executor`](common::executor::Executor) calls with
//!    [`CryptInterceptor::update`] / [`CryptInterceptor::query`].

pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod intercept;
pub mod metadata;

pub use config::Config;
pub use crypto::{AesGcmSivCipher, CipherError, KeyBytes, KeyError, StringCipher};
pub use intercept::CryptInterceptor;
pub use metadata::{CryptMetadata, MapperRegistry, MetadataCache, RegistryError};
