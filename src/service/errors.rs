//! Service error taxonomy
//!
//! - `NotFound`: the identifier resolves to no record. Expected outcome.
//! - `Validation`: the payload failed its schema.
//! - `Store`: the store call itself failed.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No record with the requested identifier
    #[error("{0}")]
    NotFound(String),

    /// Payload rejected by schema validation
    #[error(transparent)]
    Validation(#[from] SchemaError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationDetails;

    #[test]
    fn test_not_found_message_is_verbatim() {
        let err = ServiceError::not_found("No student with that ID");
        assert_eq!(err.to_string(), "No student with that ID");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_conversions() {
        let err: ServiceError = StoreError::Unavailable("down".into()).into();
        assert!(matches!(err, ServiceError::Store(_)));

        let err: ServiceError =
            SchemaError::validation_failed("student", ValidationDetails::missing_field("first")).into();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(!err.is_not_found());
    }
}
