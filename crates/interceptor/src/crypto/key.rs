//! Key material for the default cipher provider.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced while constructing key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key material has an unexpected length.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// The encoded key is not valid base64.
    #[error("key is not valid base64")]
    InvalidEncoding,
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct KeyBytes(Box<[u8; KEY_LEN]>);

impl KeyBytes {
    /// Copy key material from a slice of exactly [`KEY_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice has the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode key material from standard base64.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidEncoding`] on malformed base64 and
    /// [`KeyError::InvalidLength`] if the decoded material is not
    /// [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_slice(&bytes)
    }

    /// Derive key material from a passphrase via a single SHA-256 pass.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&digest);
        Self(buf)
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for KeyBytes {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_accepts_exact_length() {
        let key = KeyBytes::from_slice(&[0x42u8; KEY_LEN]).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            KeyBytes::from_slice(&[0u8; 16]),
            Err(KeyError::InvalidLength(16))
        ));
    }

    #[test]
    fn from_base64_round_trip() {
        let encoded = STANDARD.encode([0x07u8; KEY_LEN]);
        let key = KeyBytes::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[0x07u8; KEY_LEN]);
    }

    #[test]
    fn from_base64_rejects_garbage() {
        assert!(matches!(
            KeyBytes::from_base64("!!!not-base64!!!"),
            Err(KeyError::InvalidEncoding)
        ));
    }

    #[test]
    fn from_base64_rejects_short_material() {
        let encoded = STANDARD.encode([0u8; 8]);
        assert!(matches!(
            KeyBytes::from_base64(&encoded),
            Err(KeyError::InvalidLength(8))
        ));
    }

    #[test]
    fn passphrase_derivation_is_deterministic() {
        let a = KeyBytes::from_passphrase("correct horse battery staple");
        let b = KeyBytes::from_passphrase("correct horse battery staple");
        let c = KeyBytes::from_passphrase("different");
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn key_bytes_redacted_in_debug() {
        let key = KeyBytes::from_slice(&[0xFFu8; KEY_LEN]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
