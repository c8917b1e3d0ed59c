use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Course length used when no end date is given
pub const DEFAULT_COURSE_WEEKS: i64 = 12;

fn default_in_person() -> bool {
    true
}

/// Stored course record. `students` holds weak references: a course never
/// owns the students it lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub course_name: String,
    #[serde(default = "default_in_person")]
    pub in_person: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub students: Vec<Uuid>,
    #[serde(rename = "__v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Validated course creation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_name: String,
    #[serde(default = "default_in_person")]
    pub in_person: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub students: Vec<Uuid>,
}

impl NewCourse {
    /// Build the record to insert. Missing dates default to `now` and
    /// `DEFAULT_COURSE_WEEKS` after the start.
    pub fn into_course(self, id: Uuid, now: DateTime<Utc>) -> Course {
        let start_date = self.start_date.unwrap_or(now);
        let end_date = self
            .end_date
            .unwrap_or(start_date + Duration::weeks(DEFAULT_COURSE_WEEKS));
        Course {
            id,
            course_name: self.course_name,
            in_person: self.in_person,
            start_date,
            end_date,
            students: dedup_ids(self.students),
            version: None,
        }
    }
}

/// Remove repeated ids, keeping first occurrences in order
pub fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
