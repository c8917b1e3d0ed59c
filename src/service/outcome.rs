//! Service result payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Student;

/// Every student plus the current head count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentList {
    pub students: Vec<Student>,
    pub head_count: u64,
}

/// Arithmetic mean of one student's assignment scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallGrade {
    #[serde(rename = "_id")]
    pub student_id: Uuid,
    pub overall_grade: f64,
}

/// One student with their overall grade. `grade` is `None` when the student
/// has no assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub student: Student,
    pub grade: Option<OverallGrade>,
}

/// Result of deleting a student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Student removed and pulled from this many courses
    Deleted { courses_updated: u64 },
    /// Student removed, but no course referenced it
    NoCourseFound,
    /// Student removed, but pulling it from courses failed
    CleanupPending,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted { .. } => "Student successfully deleted",
            DeleteOutcome::NoCourseFound => "Student deleted, but no courses found",
            DeleteOutcome::CleanupPending => "Student deleted, course cleanup pending",
        }
    }

    /// Stable outcome name for API clients
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted { .. } => "deleted",
            DeleteOutcome::NoCourseFound => "no_course_found",
            DeleteOutcome::CleanupPending => "cleanup_pending",
        }
    }

    pub fn courses_updated(&self) -> u64 {
        match self {
            DeleteOutcome::Deleted { courses_updated } => *courses_updated,
            DeleteOutcome::NoCourseFound | DeleteOutcome::CleanupPending => 0,
        }
    }
}
