//! Crypto-eligibility declarations attached to operations and record fields.
//!
//! These types are the registration-time equivalent of a field/parameter/method
//! annotation: application code builds [`MapperDecl`] bundles describing which
//! parts of each data-access operation carry sensitive strings, and registers
//! them with the interceptor at startup. All types are serde-derived so a set
//! of declarations can also be loaded from a JSON manifest.

use serde::{Deserialize, Serialize};

/// Marks one field, parameter, or operation result as crypto-eligible.
///
/// `name` is only meaningful on a parameter-position declaration, where it
/// identifies the multi-parameter map key the declaration governs. On a record
/// field the declaration's presence is what matters; on an operation result
/// only the `decrypt` flag is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptField {
    /// Parameter name this declaration governs (parameter position only).
    #[serde(default)]
    pub name: String,
    /// Whether the value may be encrypted on the way into storage.
    #[serde(default = "default_true")]
    pub encrypt: bool,
    /// Whether the value may be decrypted on the way out of storage.
    #[serde(default = "default_true")]
    pub decrypt: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CryptField {
    /// An unnamed declaration with both directions enabled.
    fn default() -> Self {
        Self {
            name: String::new(),
            encrypt: true,
            decrypt: true,
        }
    }
}

impl CryptField {
    /// Declaration governing the named multi-parameter map key.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Override the `encrypt` flag.
    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Override the `decrypt` flag.
    pub fn decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt = decrypt;
        self
    }
}

/// Declarations for one data-access operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDecl {
    /// Operation name, the part of the statement identifier after the last `.`.
    pub name: String,
    /// Parameter-position declarations.
    #[serde(default)]
    pub params: Vec<CryptField>,
    /// Result declaration; absence means the result is never decrypted.
    #[serde(default)]
    pub result: Option<CryptField>,
}

impl OperationDecl {
    /// A new operation declaration with no crypto-eligible parts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            result: None,
        }
    }

    /// Attach a parameter-position declaration.
    pub fn param(mut self, field: CryptField) -> Self {
        self.params.push(field);
        self
    }

    /// Attach the result declaration.
    pub fn result(mut self, field: CryptField) -> Self {
        self.result = Some(field);
        self
    }
}

/// All declared operations of one owner type (one mapper).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperDecl {
    /// Owner type name, the part of the statement identifier before the last `.`.
    pub type_name: String,
    /// Declared operations, in declaration order. Lookup by name takes the
    /// first match; duplicate names are not disambiguated.
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

impl MapperDecl {
    /// A new mapper declaration with no operations.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            operations: Vec::new(),
        }
    }

    /// Attach an operation declaration.
    pub fn operation(mut self, op: OperationDecl) -> Self {
        self.operations.push(op);
        self
    }
}
