//! Schema validator for request payloads
//!
//! Validation semantics:
//! - All required fields are present (skipped for patches)
//! - No undeclared fields exist
//! - Field types exactly match schema types
//! - Null values are rejected
//!
//! The validator does not mutate payloads; defaults are applied later when
//! the payload is decoded into its record type.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::{FieldDef, FieldType, Schema};
use crate::store::filter::values_equal;

/// Whether required fields are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Patch,
}

/// Validates JSON payloads against a schema.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a complete payload (create).
    pub fn validate_document(&self, document: &Value) -> SchemaResult<()> {
        self.validate_root(document, Mode::Full)
    }

    /// Validates a partial payload (update). Required top-level fields may be
    /// absent, but every present field must be valid. Nested objects are
    /// still validated in full.
    pub fn validate_patch(&self, document: &Value) -> SchemaResult<()> {
        self.validate_root(document, Mode::Patch)
    }

    fn validate_root(&self, document: &Value, mode: Mode) -> SchemaResult<()> {
        let obj = document.as_object().ok_or_else(|| {
            self.fail(ValidationDetails::type_mismatch(
                "$root",
                "object",
                json_type_name(document),
            ))
        })?;

        if mode == Mode::Patch && obj.is_empty() {
            return Err(self.fail(ValidationDetails::new(
                "$root",
                "at least one field",
                "empty object",
            )));
        }

        self.validate_object(obj, &self.schema.fields, "", mode)
    }

    /// Validates an object against field definitions.
    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &BTreeMap<String, FieldDef>,
        path_prefix: &str,
        mode: Mode,
    ) -> SchemaResult<()> {
        // Check for extra fields (no undeclared fields allowed)
        for key in obj.keys() {
            if !fields.contains_key(key) {
                return Err(self.fail(ValidationDetails::extra_field(make_path(path_prefix, key))));
            }
        }

        for (field_name, field_def) in fields {
            let field_path = make_path(path_prefix, field_name);

            match obj.get(field_name) {
                Some(Value::Null) => {
                    return Err(self.fail(ValidationDetails::null_value(&field_path)));
                }
                Some(value) => {
                    self.validate_value(value, &field_def.field_type, &field_path)?;
                    if let (Some(max), Some(s)) = (field_def.max_len, value.as_str()) {
                        let len = s.chars().count();
                        if len > max {
                            return Err(self.fail(ValidationDetails::too_long(&field_path, max, len)));
                        }
                    }
                }
                None if field_def.required && mode == Mode::Full => {
                    return Err(self.fail(ValidationDetails::missing_field(field_path)));
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Validates a value against a field type.
    fn validate_value(&self, value: &Value, expected_type: &FieldType, field_path: &str) -> SchemaResult<()> {
        let ok = match expected_type {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Key => value.is_string() || value.is_i64() || value.is_u64(),
            FieldType::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            FieldType::Timestamp => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            FieldType::Object { fields } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| self.type_error(field_path, expected_type, value))?;
                return self.validate_object(obj, fields, field_path, Mode::Full);
            }
            FieldType::Array {
                element_type,
                unique_by,
            } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| self.type_error(field_path, expected_type, value))?;
                return self.validate_array(arr, element_type, unique_by.as_deref(), field_path);
            }
        };

        if ok {
            Ok(())
        } else {
            Err(self.type_error(field_path, expected_type, value))
        }
    }

    fn validate_array(
        &self,
        arr: &[Value],
        element_type: &FieldType,
        unique_by: Option<&str>,
        field_path: &str,
    ) -> SchemaResult<()> {
        let mut seen_keys: Vec<&Value> = Vec::new();

        for (i, elem) in arr.iter().enumerate() {
            let elem_path = format!("{}[{}]", field_path, i);

            if elem.is_null() {
                return Err(self.fail(ValidationDetails::null_value(&elem_path)));
            }

            self.validate_value(elem, element_type, &elem_path)?;

            if let Some(key_value) = unique_by.and_then(|key| elem.get(key)) {
                if seen_keys.iter().any(|seen| values_equal(seen, key_value)) {
                    return Err(self.fail(ValidationDetails::duplicate_key(
                        elem_path,
                        unique_by.unwrap_or_default(),
                        key_value,
                    )));
                }
                seen_keys.push(key_value);
            }
        }

        Ok(())
    }

    fn fail(&self, details: ValidationDetails) -> SchemaError {
        SchemaError::validation_failed(&self.schema.schema_id, details)
    }

    fn type_error(&self, field_path: &str, expected: &FieldType, actual: &Value) -> SchemaError {
        self.fail(ValidationDetails::type_mismatch(
            field_path,
            expected.type_name(),
            json_type_name(actual),
        ))
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
