//! The recursive shape dispatcher.
//!
//! Given a payload and the applicable crypt metadata, the dispatcher decides
//! how to decompose the payload — single string, flat list, collection
//! binding wrapper, multi-parameter map, or record — and applies the crypto
//! hooks to every qualifying string leaf.
//!
//! # Traversal rules
//!
//! - Crypto-opaque values are the global early exit of both passes.
//! - Generic maps ([`Value::Map`](common::value::Value::Map)) are never
//!   decomposed; only the framework-bound map shapes are.
//! - List traversal stops at the first crypto-opaque or generic-map element;
//!   the remainder of the list is left untouched. This is a defined
//!   terminating condition of the traversal, not a per-element skip.
//! - Collections are mutated in place; callers own their payload exclusively
//!   for the duration of one operation and must not assume immutability.

pub mod decrypt;
pub mod encrypt;

pub use decrypt::decrypt_response;
pub use encrypt::encrypt_request;

/// Key substring marking framework-injected alias entries of a
/// multi-parameter map. Alias entries duplicate a user parameter under a
/// synthetic name; processing them would encrypt the same value twice.
pub(crate) const PARAM_KEY_MARKER: &str = "param";

/// Key substring marking the list-role entry of a collection binding wrapper.
pub(crate) const LIST_KEY_MARKER: &str = "list";

/// Key substring marking the collection-role entry of a collection binding
/// wrapper. Collection-role entries alias the list-role entry and are
/// skipped.
pub(crate) const COLLECTION_KEY_MARKER: &str = "collection";
