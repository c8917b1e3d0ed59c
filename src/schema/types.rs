//! Schema type definitions
//!
//! Supported types:
//! - string: UTF-8 string
//! - number: integer or floating point
//! - bool: Boolean
//! - uuid: string holding a hyphenated UUID
//! - timestamp: RFC 3339 date-time string
//! - key: string or integer (caller-chosen identifiers)
//! - object: Nested object with field schema
//! - array: Homogeneous array with element type

use std::collections::BTreeMap;

/// Supported field types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Integer or floating point
    Number,
    /// Boolean
    Bool,
    /// Hyphenated UUID string
    Uuid,
    /// RFC 3339 date-time string
    Timestamp,
    /// String or integer
    Key,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: BTreeMap<String, FieldDef>,
    },
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        element_type: Box<FieldType>,
        /// Element field that must be unique across the array
        unique_by: Option<String>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Uuid => "uuid",
            FieldType::Timestamp => "timestamp",
            FieldType::Key => "string or integer",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }

    /// Array of the given element type
    pub fn array_of(element_type: FieldType) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
            unique_by: None,
        }
    }

    /// Array of objects whose `key` field is unique
    pub fn array_unique_by(element_type: FieldType, key: impl Into<String>) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
            unique_by: Some(key.into()),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field data type
    pub field_type: FieldType,
    /// Whether field must be present
    pub required: bool,
    /// Maximum length for string fields
    pub max_len: Option<usize>,
}

impl FieldDef {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            max_len: None,
        }
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            max_len: None,
        }
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::required(FieldType::String)
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::optional(FieldType::String)
    }

    /// Limit string length (in characters)
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }
}

/// Complete schema definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Schema identifier used in error reports
    pub schema_id: String,
    /// Field definitions
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(schema_id: impl Into<String>, fields: BTreeMap<String, FieldDef>) -> Self {
        Self {
            schema_id: schema_id.into(),
            fields,
        }
    }

    /// Copy of this schema without the named field
    pub fn without(&self, field: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(field);
        Self {
            schema_id: self.schema_id.clone(),
            fields,
        }
    }

    /// Nested object type built from this schema's fields
    pub fn as_object_type(&self) -> FieldType {
        FieldType::Object {
            fields: self.fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        let mut fields = BTreeMap::new();
        fields.insert("name".into(), FieldDef::required_string());
        fields.insert("age".into(), FieldDef::optional(FieldType::Number));

        Schema::new("users", fields)
    }

    #[test]
    fn test_without_drops_field() {
        let schema = sample_schema().without("age");
        assert!(schema.fields.contains_key("name"));
        assert!(!schema.fields.contains_key("age"));
        assert_eq!(schema.schema_id, "users");
    }

    #[test]
    fn test_as_object_type() {
        match sample_schema().as_object_type() {
            FieldType::Object { fields } => assert_eq!(fields.len(), 2),
            other => panic!("unexpected type {:?}", other),
        }
    }

    #[test]
    fn test_max_len_builder() {
        let def = FieldDef::required_string().max_len(50);
        assert_eq!(def.max_len, Some(50));
        assert!(def.required);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::String.type_name(), "string");
        assert_eq!(FieldType::Number.type_name(), "number");
        assert_eq!(FieldType::Bool.type_name(), "bool");
        assert_eq!(FieldType::Uuid.type_name(), "uuid");
        assert_eq!(FieldType::Timestamp.type_name(), "timestamp");
        assert_eq!(FieldType::Key.type_name(), "string or integer");
        assert_eq!(FieldType::array_of(FieldType::String).type_name(), "array");
    }
}
