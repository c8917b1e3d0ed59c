//! Payload schemas for roster records
//!
//! `_id` and `__v` are never declared here: identifiers and versions are
//! assigned server-side, so a payload carrying them is rejected as having
//! undeclared fields.

use std::collections::BTreeMap;

use super::types::{FieldDef, FieldType, Schema};
use crate::model::fields;

/// Longest accepted assignment name
pub const MAX_ASSIGNMENT_NAME_LEN: usize = 50;

/// Assignment payload for add-assignment and student creation
pub fn assignment_schema() -> Schema {
    let mut f = BTreeMap::new();
    f.insert(fields::ASSIGNMENT_ID.into(), FieldDef::required(FieldType::Key));
    f.insert(
        fields::ASSIGNMENT_NAME.into(),
        FieldDef::optional_string().max_len(MAX_ASSIGNMENT_NAME_LEN),
    );
    f.insert(fields::SCORE.into(), FieldDef::required(FieldType::Number));
    Schema::new("assignment", f)
}

/// Student payload for creation
pub fn student_schema() -> Schema {
    let mut f = BTreeMap::new();
    f.insert(fields::FIRST.into(), FieldDef::required_string());
    f.insert(fields::LAST.into(), FieldDef::required_string());
    f.insert(fields::GITHUB.into(), FieldDef::required_string());
    f.insert(
        fields::ASSIGNMENTS.into(),
        FieldDef::optional(FieldType::array_unique_by(
            assignment_schema().as_object_type(),
            fields::ASSIGNMENT_ID,
        )),
    );
    Schema::new("student", f)
}

/// Student payload for updates. Assignments change only through the
/// dedicated add/remove operations.
pub fn student_patch_schema() -> Schema {
    student_schema().without(fields::ASSIGNMENTS)
}

/// Course payload for creation and updates
pub fn course_schema() -> Schema {
    let mut f = BTreeMap::new();
    f.insert(fields::COURSE_NAME.into(), FieldDef::required_string());
    f.insert(fields::IN_PERSON.into(), FieldDef::optional(FieldType::Bool));
    f.insert(fields::START_DATE.into(), FieldDef::optional(FieldType::Timestamp));
    f.insert(fields::END_DATE.into(), FieldDef::optional(FieldType::Timestamp));
    f.insert(
        fields::STUDENTS.into(),
        FieldDef::optional(FieldType::array_of(FieldType::Uuid)),
    );
    Schema::new("course", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaValidator;
    use serde_json::json;

    #[test]
    fn test_student_payload() {
        let schema = student_schema();
        let validator = SchemaValidator::new(&schema);

        assert!(validator
            .validate_document(&json!({"first": "Ada", "last": "Lovelace", "github": "ada"}))
            .is_ok());
        assert!(validator
            .validate_document(&json!({"first": "Ada", "last": "Lovelace"}))
            .is_err());
    }

    #[test]
    fn test_student_with_duplicate_assignment_ids() {
        let schema = student_schema();
        let err = SchemaValidator::new(&schema)
            .validate_document(&json!({
                "first": "Ada", "last": "Lovelace", "github": "ada",
                "assignments": [
                    {"assignmentId": 1, "score": 80},
                    {"assignmentId": 1, "score": 90}
                ]
            }))
            .unwrap_err();
        assert_eq!(err.details.field, "assignments[1]");
    }

    #[test]
    fn test_student_patch_rejects_assignments() {
        let schema = student_patch_schema();
        let validator = SchemaValidator::new(&schema);

        assert!(validator.validate_patch(&json!({"github": "ada2"})).is_ok());
        assert!(validator.validate_patch(&json!({"assignments": []})).is_err());
    }

    #[test]
    fn test_assignment_payload() {
        let schema = assignment_schema();
        let validator = SchemaValidator::new(&schema);

        assert!(validator
            .validate_document(&json!({"assignmentId": 1, "score": 80}))
            .is_ok());
        assert!(validator
            .validate_document(&json!({"assignmentId": "hw-1", "assignmentName": "Loops", "score": 72.5}))
            .is_ok());
        assert!(validator.validate_document(&json!({"assignmentId": 1})).is_err());
        assert!(validator
            .validate_document(&json!({"assignmentId": 1, "score": "A+"}))
            .is_err());

        let long_name = "x".repeat(MAX_ASSIGNMENT_NAME_LEN + 1);
        assert!(validator
            .validate_document(&json!({"assignmentId": 1, "assignmentName": long_name, "score": 1}))
            .is_err());
    }

    #[test]
    fn test_course_payload() {
        let schema = course_schema();
        let validator = SchemaValidator::new(&schema);

        assert!(validator
            .validate_document(&json!({
                "courseName": "Databases",
                "inPerson": false,
                "startDate": "2024-09-01T09:00:00Z",
                "students": ["67e55044-10b1-426f-9247-bb680e5fe0c8"]
            }))
            .is_ok());
        assert!(validator
            .validate_document(&json!({"courseName": "Databases", "students": ["not-a-uuid"]}))
            .is_err());
    }
}
