//! Shared declaration surface, payload model, and errors for `fieldcrypt` crates.

pub mod decl;
pub mod error;
pub mod executor;
pub mod value;

pub use decl::{CryptField, MapperDecl, OperationDecl};
pub use error::MaskError;
pub use executor::{Executor, ResultHandler, RowBounds, Statement};
pub use value::{Record, Value};
