//! Statement crypt-metadata: registration, resolution, and caching.
//!
//! # Responsibilities
//!
//! - Hold the registration-time declarations of every data-access owner type.
//! - Map a statement identifier (`<owner-type>.<operation-name>`) to the set
//!   of encryption-eligible parameter names and the result's decryptability.
//! - Cache resolved metadata for the process lifetime, first writer wins.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto` or `crate::dispatch`.
//! - **Fail open.** An unknown statement resolves to no-crypto metadata; it
//!   never produces an error and never blocks the delegated execution.

pub mod cache;
pub mod registry;

pub use cache::{CryptMetadata, MetadataCache};
pub use registry::{MapperRegistry, RegistryError};
