//! Encrypt pass over a request payload.

use common::value::{Record, Value};

use super::{COLLECTION_KEY_MARKER, LIST_KEY_MARKER, PARAM_KEY_MARKER};
use crate::crypto::{encrypt_string, CipherError, StringCipher};
use crate::metadata::CryptMetadata;

/// Encrypt every qualifying string leaf of `payload` in place.
///
/// Decision tree, evaluated in order:
///
/// 1. Crypto-opaque payloads return unchanged.
/// 2. A bare string is encrypted unconditionally: single-string-parameter
///    operations carry no per-parameter name, so eligibility cannot be
///    selectively scoped.
/// 3. A collection binding wrapper recurses into its list-role entries; the
///    statement's parameter set gates the whole list (non-empty set means
///    every string element is eligible), because list binding flattens the
///    original parameter names.
/// 4. A multi-parameter map is walked entry by entry; string and list entries
///    are gated by the encryptable-parameter set, record entries recurse on
///    their own declarations.
/// 5. A record is walked by its field declarations. Any remaining shape has
///    no declarations and passes through unchanged.
///
/// # Errors
///
/// Propagates the first [`CipherError`] raised by the provider.
pub fn encrypt_request(
    payload: &mut Value,
    meta: &CryptMetadata,
    cipher: &dyn StringCipher,
) -> Result<(), CipherError> {
    if payload.is_opaque() {
        return Ok(());
    }

    match payload {
        Value::String(s) => {
            *s = encrypt_string(cipher, s)?;
        }
        Value::KeyedCollection(map) => {
            let eligible = meta.has_encryptable_params();
            for (key, value) in map.iter_mut() {
                if key.contains(COLLECTION_KEY_MARKER) {
                    continue;
                }
                if key.contains(LIST_KEY_MARKER) {
                    if let Value::List(items) = value {
                        encrypt_list(items, eligible, cipher)?;
                    }
                }
            }
        }
        Value::MultiParam(map) => {
            for (key, value) in map.iter_mut() {
                if value.is_opaque()
                    || matches!(value, Value::Map(_))
                    || key.contains(PARAM_KEY_MARKER)
                {
                    continue;
                }
                match value {
                    Value::String(s) => {
                        if meta.is_param_encryptable(key) {
                            *s = encrypt_string(cipher, s)?;
                        }
                    }
                    Value::List(items) => {
                        encrypt_list(items, meta.is_param_encryptable(key), cipher)?;
                    }
                    Value::Record(rec) => encrypt_record(rec, cipher)?,
                    // Remaining shapes carry no declarations.
                    _ => {}
                }
            }
        }
        Value::Record(rec) => encrypt_record(rec, cipher)?,
        _ => {}
    }

    Ok(())
}

/// Encrypt the qualifying elements of a list.
///
/// The first crypto-opaque or generic-map element terminates the traversal of
/// the entire remaining list.
pub(crate) fn encrypt_list(
    items: &mut [Value],
    eligible: bool,
    cipher: &dyn StringCipher,
) -> Result<(), CipherError> {
    for item in items.iter_mut() {
        if item.is_opaque() || matches!(item, Value::Map(_)) {
            break;
        }
        match item {
            Value::String(s) if eligible => *s = encrypt_string(cipher, s)?,
            Value::Record(rec) => encrypt_record(rec, cipher)?,
            _ => {}
        }
    }
    Ok(())
}

/// Encrypt the declared fields of a record.
///
/// Only fields whose declaration has `encrypt == true` and whose value is
/// non-null are touched: string fields are replaced with their encrypted
/// form, list fields recurse with every element eligible, any other shape is
/// left as-is. Undeclared fields are never touched.
fn encrypt_record(record: &mut Record, cipher: &dyn StringCipher) -> Result<(), CipherError> {
    for field in record.fields_mut() {
        if !field.decl.as_ref().is_some_and(|d| d.encrypt) {
            continue;
        }
        match &mut field.value {
            Value::String(s) => *s = encrypt_string(cipher, s)?,
            Value::List(items) => encrypt_list(items, true, cipher)?,
            _ => {}
        }
    }
    Ok(())
}
