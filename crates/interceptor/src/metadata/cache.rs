//! Process-wide cache of per-statement crypt metadata.
//!
//! The cache uses `arc-swap` for lock-free reads on the hot interception
//! path. Entries are immutable after creation and never evicted; growth is
//! bounded by the number of registered operations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use super::registry::MapperRegistry;

/// Cached crypto-eligibility descriptor of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CryptMetadata {
    /// Parameter names whose values may be encrypted on the request path.
    pub encryptable_params: HashSet<String>,
    /// Whether the return value may be decrypted on the response path.
    pub decryptable: bool,
}

impl CryptMetadata {
    /// Whether any parameter of the statement is encryption-eligible.
    pub fn has_encryptable_params(&self) -> bool {
        !self.encryptable_params.is_empty()
    }

    /// Whether the named parameter is encryption-eligible.
    pub fn is_param_encryptable(&self, name: &str) -> bool {
        self.encryptable_params.contains(name)
    }
}

/// Shared cache mapping statement identifier to [`CryptMetadata`].
///
/// Reads never block. Concurrent first-time resolution of the same
/// identifier is permitted; exactly one computed value is retained
/// (insert-if-absent, first writer wins) and every caller observes the
/// winning value.
#[derive(Clone, Debug)]
pub struct MetadataCache {
    inner: Arc<ArcSwap<HashMap<String, Arc<CryptMetadata>>>>,
}

impl MetadataCache {
    /// A new, empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Number of statements with cached metadata.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Whether no metadata has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Resolve the metadata for a statement identifier, computing and caching
    /// it from `registry` on first encounter.
    ///
    /// An identifier with no declared operation resolves to metadata with an
    /// empty encryptable set and `decryptable == false`: crypto is disabled
    /// for that statement, the delegated execution is never blocked.
    pub fn resolve(&self, statement_id: &str, registry: &MapperRegistry) -> Arc<CryptMetadata> {
        if let Some(found) = self.inner.load().get(statement_id) {
            return Arc::clone(found);
        }

        let computed = Arc::new(compute(statement_id, registry));
        self.inner.rcu(|current| {
            if current.contains_key(statement_id) {
                // A racing caller won; keep the map as-is.
                Arc::clone(current)
            } else {
                let mut next = HashMap::clone(current);
                next.insert(statement_id.to_owned(), Arc::clone(&computed));
                Arc::new(next)
            }
        });

        // Entries are never removed, so the key is present now — either our
        // insert or the racing winner's.
        self.inner
            .load()
            .get(statement_id)
            .map(Arc::clone)
            .unwrap_or(computed)
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive [`CryptMetadata`] from the registered operation declarations.
fn compute(statement_id: &str, registry: &MapperRegistry) -> CryptMetadata {
    let Some(op) = registry.operation(statement_id) else {
        debug!(statement = %statement_id, "no declared operation; crypto disabled");
        return CryptMetadata::default();
    };

    let encryptable_params = op
        .params
        .iter()
        .filter(|p| p.encrypt)
        .map(|p| p.name.clone())
        .collect();
    let decryptable = op.result.as_ref().is_some_and(|r| r.decrypt);

    CryptMetadata {
        encryptable_params,
        decryptable,
    }
}
