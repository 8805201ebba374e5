//! The interception hook wired around statement execution.
//!
//! One hook instance fronts an [`Executor`]: on the way in it resolves the
//! statement's crypt metadata and runs the encrypt pass over the request
//! payload, delegates to the underlying execution, then runs the decrypt pass
//! over the response. Pagination bounds and result handlers pass through
//! untouched, and errors raised by the delegated execution propagate
//! unchanged — the hook performs no error translation and no retry.

use std::sync::Arc;

use common::error::MaskError;
use common::executor::{Executor, ResultHandler, RowBounds, Statement};
use common::value::Value;

use crate::config::Config;
use crate::crypto::{AesGcmSivCipher, StringCipher};
use crate::dispatch::{decrypt_response, encrypt_request};
use crate::metadata::{MapperRegistry, MetadataCache};

/// Transparent field-crypto interceptor for a statement-execution pipeline.
///
/// Safe to share across threads behind an `Arc`; the metadata cache is the
/// only shared mutable state and supports concurrent lock-free resolution.
pub struct CryptInterceptor<C: StringCipher = AesGcmSivCipher> {
    registry: Arc<MapperRegistry>,
    cache: MetadataCache,
    cipher: C,
}

impl CryptInterceptor<AesGcmSivCipher> {
    /// Build an interceptor with the default cipher provider configured from
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is missing or malformed.
    pub fn from_env(registry: MapperRegistry) -> anyhow::Result<Self> {
        let cfg = Config::from_env()?;
        Ok(Self::new(registry, cfg.cipher()?))
    }
}

impl<C: StringCipher> CryptInterceptor<C> {
    /// Build an interceptor over the given declarations and cipher provider.
    pub fn new(registry: MapperRegistry, cipher: C) -> Self {
        Self {
            registry: Arc::new(registry),
            cache: MetadataCache::new(),
            cipher,
        }
    }

    /// Intercept a mutating statement execution.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::Cipher`] if a crypto hook fails, or whatever
    /// error the delegated execution produced, unmodified.
    pub fn update(
        &self,
        executor: &mut dyn Executor,
        statement: &Statement,
        mut param: Value,
    ) -> Result<Value, MaskError> {
        let meta = self.cache.resolve(statement.id(), &self.registry);
        encrypt_request(&mut param, &meta, &self.cipher)?;

        let mut result = executor.update(statement, param)?;

        decrypt_response(&mut result, meta.decryptable, &self.cipher)?;
        Ok(result)
    }

    /// Intercept a query execution. `bounds` and `handler` are forwarded to
    /// the executor exactly as supplied.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::Cipher`] if a crypto hook fails, or whatever
    /// error the delegated execution produced, unmodified.
    pub fn query(
        &self,
        executor: &mut dyn Executor,
        statement: &Statement,
        mut param: Value,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Value, MaskError> {
        let meta = self.cache.resolve(statement.id(), &self.registry);
        encrypt_request(&mut param, &meta, &self.cipher)?;

        let mut result = executor.query(statement, param, bounds, handler)?;

        decrypt_response(&mut result, meta.decryptable, &self.cipher)?;
        Ok(result)
    }

    /// The registered declarations this interceptor resolves against.
    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::FakeCipher;
    use common::decl::{CryptField, MapperDecl, OperationDecl};

    /// Executor fake: records what reaches the storage layer and replays a
    /// canned result.
    struct RecordingExecutor {
        seen_param: Option<Value>,
        seen_bounds: Option<RowBounds>,
        handler_invoked: bool,
        result: Result<Value, MaskError>,
    }

    impl RecordingExecutor {
        fn returning(result: Value) -> Self {
            Self {
                seen_param: None,
                seen_bounds: None,
                handler_invoked: false,
                result: Ok(result),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                seen_param: None,
                seen_bounds: None,
                handler_invoked: false,
                result: Err(MaskError::Execution(message.into())),
            }
        }

        fn take_result(&mut self) -> Result<Value, MaskError> {
            std::mem::replace(&mut self.result, Ok(Value::Null))
        }
    }

    impl Executor for RecordingExecutor {
        fn update(&mut self, _statement: &Statement, param: Value) -> Result<Value, MaskError> {
            self.seen_param = Some(param);
            self.take_result()
        }

        fn query(
            &mut self,
            _statement: &Statement,
            param: Value,
            bounds: RowBounds,
            handler: Option<&mut dyn ResultHandler>,
        ) -> Result<Value, MaskError> {
            self.seen_param = Some(param);
            self.seen_bounds = Some(bounds);
            if let Some(h) = handler {
                self.handler_invoked = true;
                h.handle(&Value::Null);
            }
            self.take_result()
        }
    }

    struct CountingHandler {
        rows: usize,
    }

    impl ResultHandler for CountingHandler {
        fn handle(&mut self, _row: &Value) {
            self.rows += 1;
        }
    }

    fn registry() -> MapperRegistry {
        let mut registry = MapperRegistry::new();
        registry.register(
            MapperDecl::new("user_dao")
                .operation(
                    OperationDecl::new("find_by_email")
                        .param(CryptField::named("email"))
                        .result(CryptField::default()),
                )
                .operation(OperationDecl::new("insert_plain")),
        );
        registry
    }

    fn interceptor() -> CryptInterceptor<FakeCipher> {
        CryptInterceptor::new(registry(), FakeCipher)
    }

    fn enc(plain: &str) -> Value {
        Value::from(format!("v1.f.{plain}"))
    }

    #[test]
    fn annotated_statement_encrypts_request_and_decrypts_response() {
        let hook = interceptor();
        let mut executor = RecordingExecutor::returning(enc("a@b.com"));

        let param = Value::multi_param([("email", Value::from("a@b.com")), ("id", Value::Int(7))]);
        let result = hook
            .update(&mut executor, &Statement::new("user_dao.find_by_email"), param)
            .unwrap();

        // Storage saw ciphertext for the declared parameter, plaintext id.
        let Some(Value::MultiParam(seen)) = &executor.seen_param else { panic!() };
        assert_eq!(seen["email"], enc("a@b.com"));
        assert_eq!(seen["id"], Value::Int(7));

        // Caller got the decrypted return value.
        assert_eq!(result, Value::from("a@b.com"));
    }

    #[test]
    fn unannotated_statement_passes_through_byte_identical() {
        let hook = interceptor();
        let param = Value::multi_param([("email", Value::from("a@b.com"))]);
        let mut executor = RecordingExecutor::returning(Value::from("row"));

        let result = hook
            .update(&mut executor, &Statement::new("user_dao.insert_plain"), param.clone())
            .unwrap();

        assert_eq!(executor.seen_param, Some(param));
        assert_eq!(result, Value::from("row"));
    }

    #[test]
    fn unknown_statement_never_blocks_execution() {
        let hook = interceptor();
        let mut executor = RecordingExecutor::returning(Value::Int(1));

        let result = hook
            .update(
                &mut executor,
                &Statement::new("other_dao.whatever"),
                Value::multi_param([("email", Value::from("a@b.com"))]),
            )
            .unwrap();

        let Some(Value::MultiParam(seen)) = &executor.seen_param else { panic!() };
        assert_eq!(seen["email"], Value::from("a@b.com"));
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    fn annotated_record_mutates_only_declared_fields() {
        let hook = interceptor();
        let mut executor = RecordingExecutor::returning(Value::Null);

        let rec = common::value::Record::new()
            .crypt_field("ssn", CryptField::default(), "123-45-6789")
            .field("name", "Alice");
        hook.update(
            &mut executor,
            &Statement::new("user_dao.insert_plain"),
            Value::Record(rec),
        )
        .unwrap();

        let Some(Value::Record(seen)) = &executor.seen_param else { panic!() };
        assert_eq!(seen.get("ssn"), Some(&enc("123-45-6789")));
        assert_eq!(seen.get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn query_forwards_bounds_and_handler_untouched() {
        let hook = interceptor();
        let mut executor = RecordingExecutor::returning(Value::List(vec![enc("a")]));
        let mut handler = CountingHandler { rows: 0 };
        let bounds = RowBounds {
            offset: 40,
            limit: 20,
        };

        let result = hook
            .query(
                &mut executor,
                &Statement::new("user_dao.find_by_email"),
                Value::from("a@b.com"),
                bounds,
                Some(&mut handler),
            )
            .unwrap();

        assert_eq!(executor.seen_bounds, Some(bounds));
        assert!(executor.handler_invoked);
        assert_eq!(handler.rows, 1);
        assert_eq!(result, Value::List(vec!["a".into()]));
    }

    #[test]
    fn execution_errors_propagate_unchanged() {
        let hook = interceptor();
        let mut executor = RecordingExecutor::failing("connection reset");

        let err = hook
            .update(
                &mut executor,
                &Statement::new("user_dao.insert_plain"),
                Value::Null,
            )
            .unwrap_err();

        match err {
            MaskError::Execution(msg) => assert_eq!(msg, "connection reset"),
            other => panic!("expected execution error, got {other}"),
        }
    }

    #[test]
    fn cipher_failure_surfaces_before_execution() {
        use crate::crypto::testing::FailingCipher;

        let hook = CryptInterceptor::new(registry(), FailingCipher);
        let mut executor = RecordingExecutor::returning(Value::Null);

        let err = hook
            .update(
                &mut executor,
                &Statement::new("user_dao.find_by_email"),
                Value::from("secret"),
            )
            .unwrap_err();

        assert!(matches!(err, MaskError::Cipher(_)));
        // The delegated execution never ran.
        assert!(executor.seen_param.is_none());
    }

    #[test]
    fn round_trip_with_default_provider() {
        let hook = CryptInterceptor::new(registry(), AesGcmSivCipher::from_passphrase("test"));
        let mut store = RecordingExecutor::returning(Value::Null);

        hook.update(
            &mut store,
            &Statement::new("user_dao.find_by_email"),
            Value::multi_param([("email", Value::from("a@b.com"))]),
        )
        .unwrap();

        let Some(Value::MultiParam(seen)) = store.seen_param.take() else { panic!() };
        let stored = seen["email"].as_str().unwrap().to_owned();
        assert!(stored.starts_with("v1."));

        // Replay the stored ciphertext as a query result.
        let mut executor = RecordingExecutor::returning(Value::List(vec![Value::from(stored)]));
        let result = hook
            .query(
                &mut executor,
                &Statement::new("user_dao.find_by_email"),
                Value::Null,
                RowBounds::default(),
                None,
            )
            .unwrap();
        assert_eq!(result, Value::List(vec!["a@b.com".into()]));
    }
}
