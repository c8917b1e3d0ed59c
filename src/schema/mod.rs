//! Payload schema validation
//!
//! Every create and update payload is checked against a static schema
//! before it reaches the store.
//!
//! - Required fields present (full documents only)
//! - No undeclared fields
//! - Exact types, no coercion
//! - No nulls

pub mod catalog;
mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, ValidationDetails};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::SchemaValidator;
