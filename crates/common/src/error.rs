//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error type surfaced by the interception layer.
///
/// Variants distinguish the two failure sources visible to callers:
/// - [`MaskError::Cipher`] — the cipher provider failed; never suppressed,
///   since masking a cipher fault could write or return unprotected data.
/// - [`MaskError::Execution`] — the delegated data-access execution failed;
///   produced by the [`Executor`](crate::executor::Executor) implementation
///   and propagated through the interceptor unmodified.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Encryption or decryption failed in the cipher provider.
    #[error("cipher failure: {0}")]
    Cipher(String),

    /// The delegated statement execution failed.
    #[error("execution failure: {0}")]
    Execution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let e = MaskError::Cipher("aead operation failed".into());
        assert!(e.to_string().contains("aead operation failed"));

        let e = MaskError::Execution("connection reset".into());
        assert!(e.to_string().contains("connection reset"));
    }
}
