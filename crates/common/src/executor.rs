//! The intercepted statement-execution boundary.
//!
//! The interceptor sits in front of an [`Executor`] implementation and wraps
//! exactly two operation kinds: `update` (statement + payload) and `query`
//! (statement + payload + pagination bounds + result handler). Bounds and
//! handler are opaque to the crypto layer and pass through untouched.

use crate::error::MaskError;
use crate::value::Value;

/// Separator between owner type and operation name in a statement identifier.
pub const STATEMENT_ID_SEPARATOR: char = '.';

/// Handle naming one data-access operation.
///
/// The identifier has the form `<owner-type>.<operation-name>` and is the key
/// under which crypt metadata is cached. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    id: String,
}

impl Statement {
    /// A statement handle for the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The full `<owner-type>.<operation-name>` identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Split the identifier on its last separator into
    /// `(owner-type, operation-name)`. `None` if there is no separator.
    pub fn split_id(&self) -> Option<(&str, &str)> {
        self.id
            .rfind(STATEMENT_ID_SEPARATOR)
            .map(|idx| (&self.id[..idx], &self.id[idx + 1..]))
    }
}

/// Pagination bounds for query operations. Passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    /// Number of rows to skip.
    pub offset: usize,
    /// Maximum number of rows to return.
    pub limit: usize,
}

impl Default for RowBounds {
    /// No offset, no effective limit.
    fn default() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }
}

/// Callback receiving result rows during query execution.
///
/// Opaque to the crypto layer; forwarded to the executor as-is.
pub trait ResultHandler {
    /// Called once per result row.
    fn handle(&mut self, row: &Value);
}

/// The statement-execution pipeline being intercepted.
///
/// Implementations perform the actual storage access. Errors they return are
/// propagated through the interceptor unmodified.
pub trait Executor {
    /// Execute a mutating statement with the (already encrypted) payload.
    fn update(&mut self, statement: &Statement, param: Value) -> Result<Value, MaskError>;

    /// Execute a query with the (already encrypted) payload. `bounds` and
    /// `handler` arrive exactly as the caller supplied them.
    fn query(
        &mut self,
        statement: &Statement,
        param: Value,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Value, MaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_id_uses_last_separator() {
        let stmt = Statement::new("com.acme.user_dao.find_by_email");
        assert_eq!(stmt.split_id(), Some(("com.acme.user_dao", "find_by_email")));
    }

    #[test]
    fn split_id_without_separator_is_none() {
        assert_eq!(Statement::new("bare").split_id(), None);
    }

    #[test]
    fn default_row_bounds_are_unbounded() {
        let bounds = RowBounds::default();
        assert_eq!(bounds.offset, 0);
        assert_eq!(bounds.limit, usize::MAX);
    }
}
