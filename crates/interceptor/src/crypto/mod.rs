//! Field crypto: key material, the cipher capability, and the two hooks the
//! dispatcher applies to qualifying string leaves.
//!
//! This module is intentionally free of payload-shape and metadata
//! dependencies. The concrete cipher is pluggable behind [`StringCipher`];
//! the shipped default is AES-256-GCM-SIV.
//!
//! # Ciphertext format of the default provider
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The `v1` prefix enables future algorithm or key-version migration without
//! breaking existing ciphertext, and doubles as the marker that
//! [`decrypt_string`] uses to tell ciphertext from never-encrypted data.

pub mod cipher;
pub mod key;

pub use cipher::{AesGcmSivCipher, CipherError, StringCipher};
pub use key::{KeyBytes, KeyError, KEY_LEN};

use cipher::{SEGMENT_SEPARATOR, VERSION_PREFIX};

/// Encrypt one string value.
///
/// Blank input (empty or whitespace-only) is a defined no-op and is returned
/// unchanged. Everything else is delegated to the cipher provider.
///
/// # Errors
///
/// Propagates any [`CipherError`] from the provider.
pub fn encrypt_string(cipher: &dyn StringCipher, value: &str) -> Result<String, CipherError> {
    if value.trim().is_empty() {
        return Ok(value.to_owned());
    }
    cipher.encrypt(value)
}

/// Decrypt one string value.
///
/// Two defined no-ops guard this hook: blank input, and input that does not
/// carry the ciphertext marker. The latter covers legacy data and values
/// whose encryption was itself a no-op; both pass through unchanged instead
/// of being reported as errors.
///
/// # Errors
///
/// Propagates any [`CipherError`] from the provider.
pub fn decrypt_string(cipher: &dyn StringCipher, value: &str) -> Result<String, CipherError> {
    if value.trim().is_empty() || !carries_ciphertext_marker(value) {
        return Ok(value.to_owned());
    }
    cipher.decrypt(value)
}

/// Whether `value` carries the ciphertext marker: the separator must split it
/// into at least two segments, the first being the version tag.
///
/// Plaintext that merely contains the separator (`"a@b.com"`) does not carry
/// the marker and is passed through by [`decrypt_string`].
pub fn carries_ciphertext_marker(value: &str) -> bool {
    let mut segments = value.split(SEGMENT_SEPARATOR);
    segments.next() == Some(VERSION_PREFIX) && segments.next().is_some()
}
