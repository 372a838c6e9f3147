//! Diagnostic types for error reporting.

mod error;

pub use error::{ErrorKind, SchemaError};

/// Result alias used throughout the crate.
pub type SchemaResult<T> = Result<T, SchemaError>;
