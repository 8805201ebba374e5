//! The pluggable string-cipher capability and its default provider.
//!
//! **Algorithm choice for the default provider:** AES-256-GCM-SIV (RFC 8452)
//! is nonce-misuse-resistant. **Do NOT substitute plain AES-256-GCM with a
//! fixed nonce.** GCM nonce reuse is catastrophic — it breaks both
//! confidentiality and authentication.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::error::MaskError;
use thiserror::Error;

use super::key::KeyBytes;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Version tag that leads every encrypted field value.
pub const VERSION_PREFIX: &str = "v1";

/// Separator between the segments of an encrypted field value.
pub const SEGMENT_SEPARATOR: char = '.';

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// AES-GCM-SIV encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The encrypted field string does not match the expected format.
    #[error("invalid encrypted field format")]
    InvalidFormat,
}

impl From<CipherError> for MaskError {
    fn from(e: CipherError) -> Self {
        MaskError::Cipher(e.to_string())
    }
}

/// The encryption/decryption capability consumed by the dispatcher.
///
/// Implementations must guarantee `decrypt(encrypt(x)) == x` for all
/// non-blank `x`, and `encrypt` output must be reliably distinguishable from
/// un-encrypted input by the ciphertext marker check.
pub trait StringCipher: Send + Sync {
    /// Encrypt a plaintext string into its ciphertext representation.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt a ciphertext representation back to the plaintext string.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// A parsed encrypted field value.
///
/// The string representation is `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EncryptedField {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptedField {
    /// Encode to the canonical string representation.
    fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
            sep = SEGMENT_SEPARATOR,
        )
    }

    /// Parse an encrypted field string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the string does not match the
    /// expected `v1.<nonce>.<ciphertext>` structure.
    fn decode(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.splitn(3, SEGMENT_SEPARATOR).collect();
        if parts.len() != 3 || parts[0] != VERSION_PREFIX {
            return Err(CipherError::InvalidFormat);
        }
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| CipherError::InvalidFormat)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_bytes);

        let ciphertext = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| CipherError::InvalidFormat)?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Default [`StringCipher`] provider: AES-256-GCM-SIV.
///
/// A random 96-bit nonce is generated per call via the OS CSPRNG, so
/// encrypting the same plaintext twice yields different ciphertext.
pub struct AesGcmSivCipher {
    cipher: Aes256GcmSiv,
}

impl AesGcmSivCipher {
    /// Build a provider from key material.
    pub fn new(key: KeyBytes) -> Self {
        Self {
            cipher: Aes256GcmSiv::new(key.as_bytes().into()),
        }
    }

    /// Build a provider from a passphrase-derived key.
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::new(KeyBytes::from_passphrase(passphrase))
    }
}

impl StringCipher for AesGcmSivCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::AeadFailure)?;

        Ok(EncryptedField {
            nonce: nonce_bytes,
            ciphertext,
        }
        .encode())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let field = EncryptedField::decode(ciphertext)?;
        let nonce = Nonce::from_slice(&field.nonce);
        let plaintext = self
            .cipher
            .decrypt(nonce, field.ciphertext.as_ref())
            .map_err(|_| CipherError::AeadFailure)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidFormat)
    }
}
