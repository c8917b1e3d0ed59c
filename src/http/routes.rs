//! Roster HTTP Routes
//!
//! Thin translation from routes to [`RosterService`] calls. Path
//! identifiers are parsed here, so the service only ever sees well-formed
//! UUIDs.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{Course, Student};
use crate::service::{RosterService, StudentDetail, StudentList};
use crate::store::DocumentStore;

use super::errors::{ApiError, ApiResult};
use super::response::{DeleteStudentResponse, MessageResponse, ReconcileResponse};

/// Shared state type
type ServiceState<S> = Arc<RosterService<S>>;

/// Create roster routes (mounted under `/api`)
pub fn roster_routes<S: DocumentStore + 'static>(service: ServiceState<S>) -> Router {
    Router::new()
        .route(
            "/students",
            get(list_students::<S>).post(create_student::<S>),
        )
        .route(
            "/students/:student_id",
            get(get_student::<S>)
                .put(update_student::<S>)
                .delete(delete_student::<S>),
        )
        .route(
            "/students/:student_id/assignments",
            post(add_assignment::<S>),
        )
        .route(
            "/students/:student_id/assignments/:assignment_id",
            delete(remove_assignment::<S>),
        )
        .route("/courses", get(list_courses::<S>).post(create_course::<S>))
        .route(
            "/courses/:course_id",
            get(get_course::<S>)
                .put(update_course::<S>)
                .delete(delete_course::<S>),
        )
        .route("/maintenance/reconcile", post(reconcile_courses::<S>))
        .with_state(service)
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId(raw.to_string()))
}

// ==================
// Students
// ==================

async fn list_students<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
) -> ApiResult<Json<StudentList>> {
    Ok(Json(service.get_students().await?))
}

async fn get_student<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<StudentDetail>> {
    let id = parse_id(&student_id)?;
    Ok(Json(service.get_single_student(id).await?))
}

async fn create_student<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let Json(body) = payload?;
    let student = service.create_student(body).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn update_student<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(student_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Student>> {
    let id = parse_id(&student_id)?;
    let Json(body) = payload?;
    Ok(Json(service.update_student(id, body).await?))
}

async fn delete_student<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<DeleteStudentResponse>> {
    let id = parse_id(&student_id)?;
    let outcome = service.delete_student(id).await?;
    Ok(Json(DeleteStudentResponse {
        outcome: outcome.as_str().to_string(),
        message: outcome.message().to_string(),
        courses_updated: outcome.courses_updated(),
    }))
}

async fn add_assignment<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(student_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Student>> {
    let id = parse_id(&student_id)?;
    let Json(body) = payload?;
    Ok(Json(service.add_assignment(id, body).await?))
}

async fn remove_assignment<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path((student_id, assignment_id)): Path<(String, String)>,
) -> ApiResult<Json<Student>> {
    let id = parse_id(&student_id)?;
    Ok(Json(service.remove_assignment(id, &assignment_id).await?))
}

// ==================
// Courses
// ==================

async fn list_courses<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(service.get_courses().await?))
}

async fn get_course<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Course>> {
    let id = parse_id(&course_id)?;
    Ok(Json(service.get_single_course(id).await?))
}

async fn create_course<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let Json(body) = payload?;
    let course = service.create_course(body).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(course_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Course>> {
    let id = parse_id(&course_id)?;
    let Json(body) = payload?;
    Ok(Json(service.update_course(id, body).await?))
}

async fn delete_course<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&course_id)?;
    service.delete_course(id).await?;
    Ok(Json(MessageResponse::new("Course successfully deleted")))
}

// ==================
// Maintenance
// ==================

async fn reconcile_courses<S: DocumentStore + 'static>(
    State(service): State<ServiceState<S>>,
) -> ApiResult<Json<ReconcileResponse>> {
    let courses_updated = service.reconcile_courses().await?;
    Ok(Json(ReconcileResponse { courses_updated }))
}
