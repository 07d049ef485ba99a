//! Errors raised while building or querying the schema catalog.

use thiserror::Error;

/// A catalog failure. Lookups fail closed: an unresolved or ambiguous name
/// is an error, never a silent default.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("table '{0}' not found")]
    UnknownTable(String),

    #[error("table name '{0}' matches more than one table; qualify it with a schema")]
    AmbiguousTable(String),

    #[error("schema introspection failed: {0}")]
    Introspection(#[from] anyhow::Error),
}
