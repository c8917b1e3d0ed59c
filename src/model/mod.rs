//! Roster record types
//!
//! Records are stored as JSON documents; these types are their decoded
//! form. Field names on the wire are camelCase to match stored documents.

mod course;
mod student;

pub use course::{dedup_ids, Course, NewCourse, DEFAULT_COURSE_WEEKS};
pub use student::{Assignment, AssignmentId, NewStudent, Student, DEFAULT_ASSIGNMENT_NAME};

/// Stored field names
pub mod fields {
    pub const FIRST: &str = "first";
    pub const LAST: &str = "last";
    pub const GITHUB: &str = "github";
    pub const ASSIGNMENTS: &str = "assignments";

    pub const ASSIGNMENT_ID: &str = "assignmentId";
    pub const ASSIGNMENT_NAME: &str = "assignmentName";
    pub const SCORE: &str = "score";

    pub const COURSE_NAME: &str = "courseName";
    pub const IN_PERSON: &str = "inPerson";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const STUDENTS: &str = "students";
}

/// Collection names
pub mod collections {
    pub const STUDENTS: &str = "students";
    pub const COURSES: &str = "courses";
}
