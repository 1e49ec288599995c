//! Record store errors
//!
//! Every failure is detected before the write transaction commits; a
//! rejected mutation leaves the table untouched.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("a record with norad_catalog {norad_catalog} or intldes '{intldes}' already exists")]
    DuplicateKey { norad_catalog: i64, intldes: String },

    #[error("no record with {catalog} '{id}'")]
    NotFound { catalog: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownColumn(_) => "TLEDB_UNKNOWN_COLUMN",
            StoreError::MalformedPayload(_) => "TLEDB_MALFORMED_PAYLOAD",
            StoreError::DuplicateKey { .. } => "TLEDB_DUPLICATE_KEY",
            StoreError::NotFound { .. } => "TLEDB_NOT_FOUND",
            StoreError::Unavailable(_) => "TLEDB_STORE_UNAVAILABLE",
        }
    }

    /// Malformed payload listing every violated constraint
    pub fn constraints(violated: &[&str]) -> Self {
        StoreError::MalformedPayload(format!(
            "violated constraints: {}",
            violated.join(", ")
        ))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
