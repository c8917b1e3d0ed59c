use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Name given to assignments submitted without one
pub const DEFAULT_ASSIGNMENT_NAME: &str = "Unnamed assignment";

fn default_assignment_name() -> String {
    DEFAULT_ASSIGNMENT_NAME.to_string()
}

/// Caller-chosen assignment identifier, unique within one student
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssignmentId {
    Int(i64),
    Text(String),
}

impl AssignmentId {
    /// Interpret a path segment. `"7"` may refer to an integer id 7 or a
    /// text id "7", so both are returned as candidate stored values.
    pub fn candidates(raw: &str) -> Vec<Value> {
        let mut values = vec![Value::String(raw.to_string())];
        if let Ok(n) = raw.parse::<i64>() {
            values.push(Value::from(n));
        }
        values
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentId::Int(n) => write!(f, "{}", n),
            AssignmentId::Text(s) => f.write_str(s),
        }
    }
}

/// A scored assignment owned by a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub assignment_id: AssignmentId,
    #[serde(default = "default_assignment_name")]
    pub assignment_name: String,
    pub score: f64,
}

/// Stored student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first: String,
    pub last: String,
    pub github: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(rename = "__v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Validated student creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub first: String,
    pub last: String,
    pub github: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl NewStudent {
    /// Build the record to insert under a fresh identifier
    pub fn into_student(self, id: Uuid) -> Student {
        Student {
            id,
            first: self.first,
            last: self.last,
            github: self.github,
            assignments: self.assignments,
            version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assignment_defaults_name() {
        let a: Assignment = serde_json::from_value(json!({"assignmentId": 1, "score": 80})).unwrap();
        assert_eq!(a.assignment_id, AssignmentId::Int(1));
        assert_eq!(a.assignment_name, DEFAULT_ASSIGNMENT_NAME);
        assert_eq!(a.score, 80.0);
    }

    #[test]
    fn test_assignment_id_text() {
        let a: Assignment =
            serde_json::from_value(json!({"assignmentId": "hw-1", "score": 1})).unwrap();
        assert_eq!(a.assignment_id, AssignmentId::Text("hw-1".into()));
        assert_eq!(a.assignment_id.to_string(), "hw-1");
    }

    #[test]
    fn test_candidates() {
        assert_eq!(AssignmentId::candidates("7"), vec![json!("7"), json!(7)]);
        assert_eq!(AssignmentId::candidates("hw"), vec![json!("hw")]);
    }

    #[test]
    fn test_student_version_skipped_when_absent() {
        let student = NewStudent {
            first: "Ada".into(),
            last: "Lovelace".into(),
            github: "ada".into(),
            assignments: Vec::new(),
        }
        .into_student(Uuid::nil());

        let value = serde_json::to_value(&student).unwrap();
        assert!(value.get("__v").is_none());
        assert_eq!(value["_id"], Uuid::nil().to_string());
        assert_eq!(value["assignments"], json!([]));
    }

    #[test]
    fn test_student_decodes_stored_document() {
        let doc = json!({
            "_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "first": "Ada", "last": "Lovelace", "github": "ada",
            "assignments": [{"assignmentId": 1, "assignmentName": "Loops", "score": 90}],
            "__v": 2
        });
        let student: Student = serde_json::from_value(doc).unwrap();
        assert_eq!(student.version, Some(2));
        assert_eq!(student.assignments.len(), 1);
    }
}
