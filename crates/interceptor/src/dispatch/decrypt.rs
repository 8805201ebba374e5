//! Decrypt pass over a response payload.

use common::value::{Record, Value};

use crate::crypto::{decrypt_string, CipherError, StringCipher};

/// Decrypt every qualifying string leaf of `payload` in place.
///
/// The mirror of the encrypt pass, gated by the single statement-level
/// `decryptable` flag: decryption eligibility is coarser than encryption
/// eligibility, driven only by the result declaration, never by parameter
/// names. Record fields are the exception — they carry their own `decrypt`
/// flag and are honoured regardless of the statement-level flag.
///
/// # Errors
///
/// Propagates the first [`CipherError`] raised by the provider.
pub fn decrypt_response(
    payload: &mut Value,
    decryptable: bool,
    cipher: &dyn StringCipher,
) -> Result<(), CipherError> {
    if payload.is_opaque() {
        return Ok(());
    }

    match payload {
        Value::String(s) if decryptable => {
            *s = decrypt_string(cipher, s)?;
        }
        Value::List(items) => decrypt_list(items, decryptable, cipher)?,
        Value::Record(rec) => decrypt_record(rec, cipher)?,
        _ => {}
    }

    Ok(())
}

/// Decrypt the qualifying elements of a list.
///
/// Same terminating condition as the encrypt pass: the first crypto-opaque or
/// generic-map element stops the traversal of the entire remaining list.
/// Record elements recurse on their own field declarations regardless of
/// `eligible`.
pub(crate) fn decrypt_list(
    items: &mut [Value],
    eligible: bool,
    cipher: &dyn StringCipher,
) -> Result<(), CipherError> {
    for item in items.iter_mut() {
        if item.is_opaque() || matches!(item, Value::Map(_)) {
            break;
        }
        match item {
            Value::String(s) if eligible => *s = decrypt_string(cipher, s)?,
            Value::Record(rec) => decrypt_record(rec, cipher)?,
            _ => {}
        }
    }
    Ok(())
}

/// Decrypt the declared fields of a record, honouring each field's own
/// `decrypt` flag.
fn decrypt_record(record: &mut Record, cipher: &dyn StringCipher) -> Result<(), CipherError> {
    for field in record.fields_mut() {
        if !field.decl.as_ref().is_some_and(|d| d.decrypt) {
            continue;
        }
        match &mut field.value {
            Value::String(s) => *s = decrypt_string(cipher, s)?,
            Value::List(items) => decrypt_list(items, true, cipher)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::FakeCipher;
    use common::decl::CryptField;

    fn enc(plain: &str) -> Value {
        Value::from(format!("v1.f.{plain}"))
    }

    #[test]
    fn opaque_results_are_untouched() {
        for mut payload in [Value::Null, Value::Int(7), Value::Bool(false)] {
            let before = payload.clone();
            decrypt_response(&mut payload, true, &FakeCipher).unwrap();
            assert_eq!(payload, before);
        }
    }

    #[test]
    fn string_result_gated_by_statement_flag() {
        let mut payload = enc("a@b.com");
        decrypt_response(&mut payload, false, &FakeCipher).unwrap();
        assert_eq!(payload, enc("a@b.com"));

        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        assert_eq!(payload, Value::from("a@b.com"));
    }

    #[test]
    fn never_encrypted_string_passes_through() {
        let mut payload = Value::from("legacy plaintext");
        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        assert_eq!(payload, Value::from("legacy plaintext"));
    }

    #[test]
    fn list_result_decrypts_strings_when_flagged() {
        let mut payload = Value::List(vec![enc("a"), enc("b")]);
        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        assert_eq!(payload, Value::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn list_result_short_circuits() {
        let mut payload = Value::List(vec![enc("a"), Value::Int(1), enc("b")]);
        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        let Value::List(items) = payload else { panic!() };
        assert_eq!(items[0], Value::from("a"));
        assert_eq!(items[2], enc("b"));
    }

    #[test]
    fn record_elements_decrypt_despite_unflagged_statement() {
        let rec = common::value::Record::new()
            .crypt_field("ssn", CryptField::default(), enc("123"))
            .field("name", enc("untouched"));
        let mut payload = Value::List(vec![Value::Record(rec)]);
        decrypt_response(&mut payload, false, &FakeCipher).unwrap();
        let Value::List(items) = payload else { panic!() };
        let Value::Record(rec) = &items[0] else { panic!() };
        assert_eq!(rec.get("ssn"), Some(&Value::from("123")));
        // Undeclared field keeps its (ciphertext-shaped) value.
        assert_eq!(rec.get("name"), Some(&enc("untouched")));
    }

    #[test]
    fn record_honours_decrypt_false() {
        let mut payload = Value::Record(common::value::Record::new().crypt_field(
            "ssn",
            CryptField::default().decrypt(false),
            enc("123"),
        ));
        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        let Value::Record(rec) = payload else { panic!() };
        assert_eq!(rec.get("ssn"), Some(&enc("123")));
    }

    #[test]
    fn record_list_field_is_fully_eligible() {
        let mut payload = Value::Record(common::value::Record::new().crypt_field(
            "aliases",
            CryptField::default(),
            Value::List(vec![enc("x"), enc("y")]),
        ));
        decrypt_response(&mut payload, false, &FakeCipher).unwrap();
        let Value::Record(rec) = payload else { panic!() };
        assert_eq!(
            rec.get("aliases"),
            Some(&Value::List(vec!["x".into(), "y".into()]))
        );
    }

    #[test]
    fn generic_map_result_passes_through() {
        let mut payload = Value::Map([("k".to_owned(), enc("v"))].into());
        let before = payload.clone();
        decrypt_response(&mut payload, true, &FakeCipher).unwrap();
        assert_eq!(payload, before);
    }

    #[test]
    fn round_trip_restores_request() {
        use crate::dispatch::encrypt::encrypt_list;

        let mut items: Vec<Value> = vec!["alpha".into(), "beta".into()];
        encrypt_list(&mut items, true, &FakeCipher).unwrap();
        assert_ne!(items[0], Value::from("alpha"));
        decrypt_list(&mut items, true, &FakeCipher).unwrap();
        assert_eq!(items, vec![Value::from("alpha"), Value::from("beta")]);
    }
}
