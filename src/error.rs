//! Error taxonomy
//!
//! Store, validation and repository failures, plus the error type raised
//! inside a middleware/controller chain. Route-not-found is a 404 response,
//! not an error value.

use std::fmt;
use thiserror::Error;

/// File store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on collection '{collection}': {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize collection '{collection}': {source}")]
    Serialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Collection '{collection}' is not a JSON array: {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid collection name: '{0}'")]
    InvalidName(String),
}

/// Why a field failed schema validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Missing,
    InvalidType { expected: &'static str },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::InvalidType { expected } => write!(f, "must be a {expected}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Field '{field}' {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

/// Repository failures surfaced from `create_one`
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Field '{field}' must be unique")]
    Uniqueness { field: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure inside a middleware/controller chain, answered with a bare 500
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Failed to build response: {0}")]
    Response(String),
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        Self::Repository(RepositoryError::Store(err))
    }
}
