//! Query validation errors
//!
//! Every variant is raised before the store is touched.

use thiserror::Error;

use crate::schema::ValueType;

/// Result type for predicate construction
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Column is not part of the searchable set
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Operator token is not in the vocabulary
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Wrong number of values for the operator
    #[error("operator '{operator}' takes {expected}, got {actual}")]
    ArityMismatch {
        operator: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// Argument does not parse as the column's type
    #[error("value '{value}' is not a valid {expected} for column '{column}'")]
    TypeCoercion {
        column: &'static str,
        expected: ValueType,
        value: String,
    },

    /// Path segment is not valid percent-encoded UTF-8
    #[error("value '{0}' is not valid percent-encoded UTF-8")]
    InvalidEncoding(String),
}

impl QueryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnknownColumn(_) => "TLEDB_UNKNOWN_COLUMN",
            QueryError::UnknownOperator(_) => "TLEDB_UNKNOWN_OPERATOR",
            QueryError::ArityMismatch { .. } => "TLEDB_ARITY_MISMATCH",
            QueryError::TypeCoercion { .. } => "TLEDB_TYPE_COERCION",
            QueryError::InvalidEncoding(_) => "TLEDB_INVALID_ENCODING",
        }
    }
}
