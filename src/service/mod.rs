//! # Roster Query Service
//!
//! Translates roster operations into document store calls. The store is an
//! injected dependency; the service holds no other state.
//!
//! The only derived values are the two aggregations:
//! - head count: `Count` over all students
//! - overall grade: `Match(_id) -> Unwind(assignments) -> Group(_id, Avg(score))`

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::{
    collections, dedup_ids, fields, Assignment, AssignmentId, Course, NewCourse, NewStudent,
    Student,
};
use crate::schema::catalog::{
    assignment_schema, course_schema, student_patch_schema, student_schema,
};
use crate::schema::{Schema, SchemaError, SchemaValidator, ValidationDetails};
use crate::store::{
    Accumulator, Document, DocumentStore, Filter, Pipeline, Projection, StoreError, Update,
    UpdateSummary, ID_FIELD, VERSION_FIELD,
};

mod errors;
mod outcome;

pub use errors::{ServiceError, ServiceResult};
pub use outcome::{DeleteOutcome, OverallGrade, StudentDetail, StudentList};

/// Output field of the head-count aggregation
pub const STUDENT_COUNT: &str = "studentCount";

/// Output field of the average-grade aggregation
pub const OVERALL_GRADE: &str = "overallGrade";

const NO_STUDENT_WITH_ID: &str = "No student with that ID";
const NO_SUCH_STUDENT: &str = "No such student exists";
const NO_STUDENT_FOUND: &str = "No student found with that ID";
const NO_COURSE_WITH_ID: &str = "No course with that ID";

/// Student and course operations over a document store
pub struct RosterService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for RosterService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> RosterService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==================
    // Aggregations
    // ==================

    /// Number of student records. An empty aggregation result reads as 0.
    pub async fn head_count(&self) -> ServiceResult<u64> {
        let pipeline = Pipeline::new().count(STUDENT_COUNT);
        let rows = self.store.aggregate(collections::STUDENTS, &pipeline).await?;

        Ok(rows
            .first()
            .and_then(|row| row.get(STUDENT_COUNT))
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    /// Mean score across one student's assignments.
    ///
    /// `None` when the student does not exist or has no assignments.
    pub async fn average_grade(&self, student_id: Uuid) -> ServiceResult<Option<OverallGrade>> {
        let pipeline = Pipeline::new()
            .matching(Filter::by_id(student_id.to_string()))
            .unwind(fields::ASSIGNMENTS)
            .group(
                ID_FIELD,
                vec![(
                    OVERALL_GRADE.to_string(),
                    Accumulator::Avg(format!("{}.{}", fields::ASSIGNMENTS, fields::SCORE)),
                )],
            );
        let rows = self.store.aggregate(collections::STUDENTS, &pipeline).await?;

        Ok(rows
            .first()
            .and_then(|row| row.get(OVERALL_GRADE))
            .and_then(Value::as_f64)
            .map(|overall_grade| OverallGrade {
                student_id,
                overall_grade,
            }))
    }

    // ==================
    // Students
    // ==================

    /// All students in store order, with the head count
    pub async fn get_students(&self) -> ServiceResult<StudentList> {
        let docs = self
            .store
            .find(collections::STUDENTS, &Filter::all())
            .await?;
        let students = decode_all(collections::STUDENTS, docs)?;
        let head_count = self.head_count().await?;

        Ok(StudentList {
            students,
            head_count,
        })
    }

    /// One student without its version field, joined with its overall grade
    pub async fn get_single_student(&self, student_id: Uuid) -> ServiceResult<StudentDetail> {
        let projection = Projection::full().exclude(VERSION_FIELD);
        let doc = self
            .store
            .find_one(collections::STUDENTS, &id_filter(student_id), &projection)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_STUDENT_WITH_ID))?;

        let student = decode(collections::STUDENTS, doc)?;
        let grade = self.average_grade(student_id).await?;

        Ok(StudentDetail { student, grade })
    }

    pub async fn create_student(&self, payload: Value) -> ServiceResult<Student> {
        let schema = student_schema();
        SchemaValidator::new(&schema).validate_document(&payload)?;
        let new: NewStudent = decode_payload(&schema, payload)?;

        let student = new.into_student(Uuid::new_v4());
        let stored = self
            .store
            .insert_one(collections::STUDENTS, encode(&student)?)
            .await?;

        tracing::info!(event = "STUDENT_CREATED", student_id = %student.id);
        decode(collections::STUDENTS, stored)
    }

    /// Overwrite profile fields of a student
    pub async fn update_student(&self, student_id: Uuid, patch: Value) -> ServiceResult<Student> {
        let schema = student_patch_schema();
        SchemaValidator::new(&schema).validate_patch(&patch)?;

        let update = Update::set(into_map(patch));
        let doc = self
            .store
            .find_one_and_update(collections::STUDENTS, &id_filter(student_id), &update)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_STUDENT_FOUND))?;

        tracing::info!(event = "STUDENT_UPDATED", student_id = %student_id);
        decode(collections::STUDENTS, doc)
    }

    /// Delete a student, then pull its id from every course listing it.
    ///
    /// The response reflects the student removal. If the course cleanup
    /// fails the outcome is `CleanupPending`; [`Self::reconcile_courses`]
    /// removes the dangling id later.
    pub async fn delete_student(&self, student_id: Uuid) -> ServiceResult<DeleteOutcome> {
        let removed = self
            .store
            .find_one_and_remove(collections::STUDENTS, &id_filter(student_id))
            .await?;
        if removed.is_none() {
            return Err(ServiceError::not_found(NO_SUCH_STUDENT));
        }
        tracing::info!(event = "STUDENT_DELETED", student_id = %student_id);

        let summary = match self.pull_from_courses(&student_id.to_string()).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(
                    event = "STUDENT_CLEANUP_FAILED",
                    student_id = %student_id,
                    error = %e
                );
                return Ok(DeleteOutcome::CleanupPending);
            }
        };

        if summary.modified == 0 {
            tracing::warn!(event = "STUDENT_DELETED_NO_COURSE", student_id = %student_id);
            return Ok(DeleteOutcome::NoCourseFound);
        }

        tracing::info!(
            event = "STUDENT_REMOVED_FROM_COURSES",
            student_id = %student_id,
            courses = summary.modified
        );
        Ok(DeleteOutcome::Deleted {
            courses_updated: summary.modified,
        })
    }

    /// Pull every student id that no longer resolves to a student from all
    /// courses. Safe to repeat. Returns the number of courses changed.
    ///
    /// Courses are read before students are checked, and each id is looked
    /// up again right before it is pulled. Student ids are never reused, so
    /// an id with no student at that point stays dangling.
    pub async fn reconcile_courses(&self) -> ServiceResult<u64> {
        let courses = self
            .store
            .find(collections::COURSES, &Filter::all())
            .await?;

        let mut listed: Vec<String> = Vec::new();
        for course in &courses {
            let ids = course
                .get(fields::STUDENTS)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str);
            for id in ids {
                if !listed.iter().any(|l| l == id) {
                    listed.push(id.to_string());
                }
            }
        }

        let mut dangling = 0usize;
        let mut changed: Vec<Value> = Vec::new();
        for id in &listed {
            let student = self
                .store
                .find_one(collections::STUDENTS, &Filter::by_id(id.as_str()), &Projection::full())
                .await?;
            if student.is_some() {
                continue;
            }
            dangling += 1;

            let touched = self
                .store
                .find(collections::COURSES, &Filter::all().eq(fields::STUDENTS, id.as_str()))
                .await?;
            self.pull_from_courses(id).await?;
            for course in touched {
                if let Some(course_id) = course.get(ID_FIELD) {
                    if !changed.contains(course_id) {
                        changed.push(course_id.clone());
                    }
                }
            }
        }

        let courses_updated = changed.len() as u64;
        tracing::info!(
            event = "COURSES_RECONCILED",
            dangling = dangling,
            courses = courses_updated
        );
        Ok(courses_updated)
    }

    async fn pull_from_courses(&self, student_id: &str) -> ServiceResult<UpdateSummary> {
        Ok(self
            .store
            .update_many(
                collections::COURSES,
                &Filter::all().eq(fields::STUDENTS, student_id),
                &Update::pull_value(fields::STUDENTS, student_id),
            )
            .await?)
    }

    /// Insert an assignment, or replace the one with the same `assignmentId`
    pub async fn add_assignment(&self, student_id: Uuid, payload: Value) -> ServiceResult<Student> {
        let schema = assignment_schema();
        SchemaValidator::new(&schema).validate_document(&payload)?;
        let assignment: Assignment = decode_payload(&schema, payload)?;

        let update = Update::upsert_by_key(
            fields::ASSIGNMENTS,
            fields::ASSIGNMENT_ID,
            encode(&assignment)?,
        );
        let doc = self
            .store
            .find_one_and_update(collections::STUDENTS, &id_filter(student_id), &update)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_STUDENT_FOUND))?;

        tracing::info!(
            event = "ASSIGNMENT_ADDED",
            student_id = %student_id,
            assignment_id = %assignment.assignment_id
        );
        decode(collections::STUDENTS, doc)
    }

    /// Remove every assignment whose id matches `assignment_id`.
    ///
    /// An unknown assignment leaves the student unchanged and still returns it.
    pub async fn remove_assignment(&self, student_id: Uuid, assignment_id: &str) -> ServiceResult<Student> {
        let update = Update::pull_matching(
            fields::ASSIGNMENTS,
            Filter::all().any_of(fields::ASSIGNMENT_ID, AssignmentId::candidates(assignment_id)),
        );
        let doc = self
            .store
            .find_one_and_update(collections::STUDENTS, &id_filter(student_id), &update)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_STUDENT_FOUND))?;

        tracing::info!(
            event = "ASSIGNMENT_REMOVED",
            student_id = %student_id,
            assignment_id = assignment_id
        );
        decode(collections::STUDENTS, doc)
    }

    // ==================
    // Courses
    // ==================

    pub async fn get_courses(&self) -> ServiceResult<Vec<Course>> {
        let docs = self
            .store
            .find(collections::COURSES, &Filter::all())
            .await?;
        decode_all(collections::COURSES, docs)
    }

    pub async fn get_single_course(&self, course_id: Uuid) -> ServiceResult<Course> {
        let projection = Projection::full().exclude(VERSION_FIELD);
        let doc = self
            .store
            .find_one(collections::COURSES, &id_filter(course_id), &projection)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_COURSE_WITH_ID))?;
        decode(collections::COURSES, doc)
    }

    pub async fn create_course(&self, payload: Value) -> ServiceResult<Course> {
        let schema = course_schema();
        SchemaValidator::new(&schema).validate_document(&payload)?;
        let new: NewCourse = decode_payload(&schema, payload)?;

        let course = new.into_course(Uuid::new_v4(), Utc::now());
        let stored = self
            .store
            .insert_one(collections::COURSES, encode(&course)?)
            .await?;

        tracing::info!(event = "COURSE_CREATED", course_id = %course.id);
        decode(collections::COURSES, stored)
    }

    pub async fn update_course(&self, course_id: Uuid, patch: Value) -> ServiceResult<Course> {
        let schema = course_schema();
        SchemaValidator::new(&schema).validate_patch(&patch)?;

        let mut fields_to_set = into_map(patch);
        if let Some(students) = fields_to_set.remove(fields::STUDENTS) {
            let ids: Vec<Uuid> = decode_payload(&schema, students)?;
            fields_to_set.insert(fields::STUDENTS.to_string(), encode(&dedup_ids(ids))?);
        }

        let update = Update::set(fields_to_set);
        let doc = self
            .store
            .find_one_and_update(collections::COURSES, &id_filter(course_id), &update)
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_COURSE_WITH_ID))?;

        tracing::info!(event = "COURSE_UPDATED", course_id = %course_id);
        decode(collections::COURSES, doc)
    }

    /// Delete a course. Listed students are left untouched.
    pub async fn delete_course(&self, course_id: Uuid) -> ServiceResult<Course> {
        let doc = self
            .store
            .find_one_and_remove(collections::COURSES, &id_filter(course_id))
            .await?
            .ok_or_else(|| ServiceError::not_found(NO_COURSE_WITH_ID))?;

        tracing::info!(event = "COURSE_DELETED", course_id = %course_id);
        decode(collections::COURSES, doc)
    }
}

fn id_filter(id: Uuid) -> Filter {
    Filter::by_id(id.to_string())
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn encode<T: serde::Serialize>(value: &T) -> ServiceResult<Document> {
    serde_json::to_value(value).map_err(|e| StoreError::InvalidDocument(e.to_string()).into())
}

fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> ServiceResult<T> {
    serde_json::from_value(doc).map_err(|e| StoreError::malformed(collection, e).into())
}

fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> ServiceResult<Vec<T>> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

/// Decode an already validated payload into its record type
fn decode_payload<T: DeserializeOwned>(schema: &Schema, payload: Value) -> ServiceResult<T> {
    serde_json::from_value(payload).map_err(|e| {
        SchemaError::validation_failed(
            &schema.schema_id,
            ValidationDetails::new("$root", "decodable payload", e.to_string()),
        )
        .into()
    })
}
