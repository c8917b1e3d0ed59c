//! Schema error types
//!
//! A validation failure always names the offending field path, what the
//! schema expected there and what the payload contained.

use std::fmt;

use thiserror::Error;

/// Result type for schema validation
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "assignments[0].score")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn extra_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "extra field present")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }

    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(
            field,
            format!("at most {} characters", max),
            format!("{} characters", actual),
        )
    }

    pub fn duplicate_key(field: impl Into<String>, key: &str, value: impl fmt::Display) -> Self {
        Self::new(
            field,
            format!("unique '{}' values", key),
            format!("duplicate '{}'", value),
        )
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Payload rejected by a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{schema_id} validation failed: {details}")]
pub struct SchemaError {
    /// Schema the payload was checked against
    pub schema_id: String,
    /// What went wrong
    pub details: ValidationDetails,
}

impl SchemaError {
    pub fn validation_failed(schema_id: impl Into<String>, details: ValidationDetails) -> Self {
        Self {
            schema_id: schema_id.into(),
            details,
        }
    }

    /// Stable error code for API payloads
    pub fn code(&self) -> &'static str {
        "SCHEMA_VALIDATION_FAILED"
    }
}
