//! Errors raised while building a dispatch table.
//!
//! Resolution itself never fails: a call that no binding accepts is the
//! [`Resolution::NoMatch`](crate::Resolution::NoMatch) outcome, not an error.

use thiserror::Error;

/// Errors that can occur while constructing rules, schemas or bindings.
#[derive(Debug, Error)]
pub enum PolyError {
    #[error("invalid rule `{rule}`; if you expected this to work, first remove any whitespace")]
    InvalidRule { rule: String },

    #[error("union rules must contain at least one member")]
    EmptyUnion,

    #[error("union rules cannot contain another union: `{rule}`")]
    NestedUnion { rule: String },

    #[error("handlers may only be functions, found {found}")]
    InvalidHandler { found: &'static str },

    #[error("fallback may only be a function, found {found}")]
    InvalidFallback { found: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for table construction.
pub type PolyResult<T> = Result<T, PolyError>;
