//! Student record handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{BulkDeleteRequest, ForceParams};
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateStudent, NewAuditEntry, Student, UpdateStudent};
use crate::errors::AppResult;
use crate::types::{BulkDeleteResponse, NoContent, Paginated, PaginationParams};

/// Student creation request; the student number is generated server-side
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub course_id: Option<Uuid>,
}

/// Student routes (admin and encoder)
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/:id", get(get_student).put(update_student).delete(delete_student))
        .route("/bulk-delete", post(bulk_delete_students))
}

/// List students
#[utoipa::path(
    get,
    path = "/students",
    tag = "Students",
    params(PaginationParams),
    responses((status = 200, description = "Students page"))
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Student>>> {
    let page = state.services.students().list_students(&params).await?;

    Ok(Json(page))
}

/// Get one student
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "Students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Student>> {
    let student = state.services.students().get_student(id).await?;

    Ok(Json(student))
}

/// Enroll a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "Students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let student = state
        .services
        .students()
        .create_student(CreateStudent {
            first_name: payload.first_name,
            middle_name: payload.middle_name,
            last_name: payload.last_name,
            email: payload.email,
            birth_date: payload.birth_date,
            course_id: payload.course_id,
        })
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "student")
                .entity_id(student.id)
                .details(json!({ "studentNo": student.student_no })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(student)))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "Students",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    let student = state.services.students().update_student(id, changes).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "update", "student").entity_id(student.id))
        .await;

    Ok(Json(student))
}

/// Delete a student; `?force=true` removes reservations and grades too
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "Students",
    params(
        ("id" = Uuid, Path, description = "Student id"),
        ForceParams
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student has reservations or grades")
    )
)]
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<ForceParams>,
) -> AppResult<NoContent> {
    state
        .services
        .students()
        .delete_student(id, params.force)
        .await?;

    let action = if params.force { "force-delete" } else { "delete" };
    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, action, "student").entity_id(id))
        .await;

    Ok(NoContent)
}

/// Delete many students, skipping blocked ones
#[utoipa::path(
    post,
    path = "/students/bulk-delete",
    tag = "Students",
    request_body = BulkDeleteRequest,
    responses((status = 200, description = "Deletion counts", body = BulkDeleteResponse))
)]
pub async fn bulk_delete_students(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let outcome = state
        .services
        .students()
        .bulk_delete_students(payload.ids, payload.force)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "bulk-delete", "student")
                .details(json!({ "deleted": outcome.deleted, "skipped": outcome.skipped })),
        )
        .await;

    Ok(Json(outcome))
}
