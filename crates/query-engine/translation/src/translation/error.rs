//! Errors for query translation.

use restbridge_configuration::CatalogError;
use thiserror::Error;

/// A type for translation errors. Every variant aborts the whole request
/// before any partial statement is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed filter syntax; carries the offending substring.
    #[error("unable to parse filter at '{0}'")]
    Parse(String),

    /// Table resolution failed (unknown or ambiguous name).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("column '{column}' not found in table '{table}'")]
    UnknownColumn { column: String, table: String },

    /// The operator has no meaning for the resolved column's type, or the
    /// operand cannot be coerced to that type.
    #[error("operator '{operator}' is not supported for '{field}'")]
    UnsupportedOperator { operator: String, field: String },

    /// The table set mixes duplicated and singleton entries, so neither a
    /// union nor a join can be inferred.
    #[error("table set mixes duplicated and singleton tables; cannot infer a union")]
    AmbiguousShape,

    /// A post-validation invariant failed while rendering. This is an
    /// internal defect, not a problem with the request.
    #[error("statement rendering invariant violated: {0}")]
    Render(String),

    /// An unexpected lower-layer failure, preserving the most specific
    /// cause message for observability.
    #[error("data access error: {0}")]
    DataAccess(String),
}
