//! Registration-time mapper declarations, looked up by statement identifier.
//!
//! The registry replaces runtime reflection: application code registers one
//! [`MapperDecl`] per owner type at startup (or loads them from a JSON
//! manifest), and the cache resolves statement identifiers against it.

use std::collections::HashMap;

use common::decl::{MapperDecl, OperationDecl};
use common::executor::STATEMENT_ID_SEPARATOR;
use thiserror::Error;

/// Errors produced while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The declaration manifest is not valid JSON of the expected shape.
    #[error("malformed declaration manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Immutable map from owner type name to its declared operations.
///
/// Built once at startup and shared read-only afterwards; all interception
/// lookups go through [`MapperRegistry::operation`].
#[derive(Debug, Default)]
pub struct MapperRegistry {
    mappers: HashMap<String, MapperDecl>,
}

impl MapperRegistry {
    /// An empty registry. Every statement resolves to no-crypto.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the declarations of one owner type.
    ///
    /// Registering the same type name again replaces the earlier bundle.
    pub fn register(&mut self, mapper: MapperDecl) -> &mut Self {
        self.mappers.insert(mapper.type_name.clone(), mapper);
        self
    }

    /// Build a registry from a JSON manifest: an array of mapper declaration
    /// objects.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Manifest`] on malformed input. Manifest
    /// problems surface here, at registration time, never during
    /// interception.
    pub fn from_json(manifest: &str) -> Result<Self, RegistryError> {
        let mappers: Vec<MapperDecl> = serde_json::from_str(manifest)?;
        let mut registry = Self::new();
        for mapper in mappers {
            registry.register(mapper);
        }
        Ok(registry)
    }

    /// Locate the operation a statement identifier names.
    ///
    /// The identifier is split on its *last* separator into owner type and
    /// operation name; the first declared operation with a matching name wins
    /// (no overload disambiguation). `None` if the identifier has no
    /// separator, the owner type is unregistered, or no operation matches.
    pub fn operation(&self, statement_id: &str) -> Option<&OperationDecl> {
        let idx = statement_id.rfind(STATEMENT_ID_SEPARATOR)?;
        let (owner, op_name) = (&statement_id[..idx], &statement_id[idx + 1..]);
        self.mappers
            .get(owner)?
            .operations
            .iter()
            .find(|op| op.name == op_name)
    }

    /// Number of registered owner types.
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether the registry has no registrations.
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
