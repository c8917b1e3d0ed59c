//! # Store Errors
//!
//! Failures raised by a document store. These are the only errors the
//! service layer treats as internal failures.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A document with the same `_id` already exists in the collection
    #[error("Duplicate key: collection '{collection}' already contains _id '{id}'")]
    DuplicateKey { collection: String, id: String },

    /// Inserted value is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Update cannot be applied to the matched document
    #[error("Invalid update on field '{field}': {reason}")]
    InvalidUpdate { field: String, reason: String },

    /// Stored document could not be decoded into its record type
    #[error("Malformed document in '{collection}': {reason}")]
    MalformedDocument { collection: String, reason: String },

    /// Backend is unreachable or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn invalid_update(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUpdate {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(collection: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            collection: collection.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code for logs and API payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "STORE_DUPLICATE_KEY",
            Self::InvalidDocument(_) => "STORE_INVALID_DOCUMENT",
            Self::InvalidUpdate { .. } => "STORE_INVALID_UPDATE",
            Self::MalformedDocument { .. } => "STORE_MALFORMED_DOCUMENT",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}
