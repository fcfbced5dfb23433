//! Grade handlers.
//!
//! Clients submit component scores only; `finalGrade` and `remarks` in the
//! responses are always server-derived.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateGrade, Grade, NewAuditEntry, UpdateGrade};
use crate::errors::AppResult;
use crate::types::{NoContent, Paginated, PaginationParams};

/// Grade routes (admin and encoder)
pub fn grade_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_grades).post(create_grade))
        .route("/:id", get(get_grade).put(update_grade).delete(delete_grade))
        .route("/student/:student_id", get(list_grades_for_student))
}

/// List grades
#[utoipa::path(
    get,
    path = "/grades",
    tag = "Grades",
    params(PaginationParams),
    responses((status = 200, description = "Grades page"))
)]
pub async fn list_grades(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Grade>>> {
    let page = state.services.grades().list_grades(&params).await?;

    Ok(Json(page))
}

/// Get one grade
#[utoipa::path(
    get,
    path = "/grades/{id}",
    tag = "Grades",
    params(("id" = Uuid, Path, description = "Grade id")),
    responses(
        (status = 200, description = "Grade found", body = Grade),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn get_grade(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Grade>> {
    let grade = state.services.grades().get_grade(id).await?;

    Ok(Json(grade))
}

/// All grades of one student
#[utoipa::path(
    get,
    path = "/grades/student/{student_id}",
    tag = "Grades",
    params(("student_id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "The student's grades", body = [Grade]),
        (status = 404, description = "Student not found")
    )
)]
pub async fn list_grades_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> AppResult<Json<Vec<Grade>>> {
    let grades = state
        .services
        .grades()
        .list_grades_for_student(student_id)
        .await?;

    Ok(Json(grades))
}

/// Record a grade row
#[utoipa::path(
    post,
    path = "/grades",
    tag = "Grades",
    request_body = CreateGrade,
    responses(
        (status = 201, description = "Grade created", body = Grade),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Grade already exists for this student and subject")
    )
)]
pub async fn create_grade(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateGrade>,
) -> AppResult<(StatusCode, Json<Grade>)> {
    let grade = state.services.grades().create_grade(payload).await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "grade")
                .entity_id(grade.id)
                .details(json!({
                    "studentId": grade.student_id,
                    "subjectId": grade.subject_id,
                    "finalGrade": grade.final_grade,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(grade)))
}

/// Replace a grade's component scores
#[utoipa::path(
    put,
    path = "/grades/{id}",
    tag = "Grades",
    params(("id" = Uuid, Path, description = "Grade id")),
    request_body = UpdateGrade,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn update_grade(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateGrade>,
) -> AppResult<Json<Grade>> {
    let grade = state.services.grades().update_grade(id, changes).await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "update", "grade")
                .entity_id(grade.id)
                .details(json!({ "finalGrade": grade.final_grade })),
        )
        .await;

    Ok(Json(grade))
}

/// Delete a grade row
#[utoipa::path(
    delete,
    path = "/grades/{id}",
    tag = "Grades",
    params(("id" = Uuid, Path, description = "Grade id")),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn delete_grade(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.grades().delete_grade(id).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "delete", "grade").entity_id(id))
        .await;

    Ok(NoContent)
}
