//! Course handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{BulkDeleteRequest, ForceParams};
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Course, CreateCourse, NewAuditEntry, UpdateCourse};
use crate::errors::AppResult;
use crate::types::{BulkDeleteResponse, NoContent, Paginated, PaginationParams};

/// Course creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "Course code is required"))]
    #[schema(example = "BSIT")]
    pub code: String,
    #[validate(length(min = 1, message = "Course name is required"))]
    #[schema(example = "BS Information Technology")]
    pub name: String,
    pub description: Option<String>,
}

/// Course routes (admin and encoder)
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
        .route("/bulk-delete", post(bulk_delete_courses))
}

/// List courses
#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(PaginationParams),
    responses((status = 200, description = "Courses page"))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Course>>> {
    let page = state.services.courses().list_courses(&params).await?;

    Ok(Json(page))
}

/// Get one course
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Courses",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    let course = state.services.courses().get_course(id).await?;

    Ok(Json(course))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 409, description = "Course code already in use")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = state
        .services
        .courses()
        .create_course(CreateCourse {
            code: payload.code,
            name: payload.name,
            description: payload.description,
        })
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "course")
                .entity_id(course.id)
                .details(json!({ "code": course.code })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "Courses",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourse,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course code already in use")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateCourse>,
) -> AppResult<Json<Course>> {
    let course = state.services.courses().update_course(id, changes).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "update", "course").entity_id(course.id))
        .await;

    Ok(Json(course))
}

/// Delete a course; `?force=true` removes the whole subtree
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "Courses",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ForceParams
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course has students, subjects, or grades")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<ForceParams>,
) -> AppResult<NoContent> {
    state
        .services
        .courses()
        .delete_course(id, params.force)
        .await?;

    let action = if params.force { "force-delete" } else { "delete" };
    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, action, "course").entity_id(id))
        .await;

    Ok(NoContent)
}

/// Delete many courses, skipping blocked ones
#[utoipa::path(
    post,
    path = "/courses/bulk-delete",
    tag = "Courses",
    request_body = BulkDeleteRequest,
    responses((status = 200, description = "Deletion counts", body = BulkDeleteResponse))
)]
pub async fn bulk_delete_courses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let outcome = state
        .services
        .courses()
        .bulk_delete_courses(payload.ids, payload.force)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "bulk-delete", "course")
                .details(json!({ "deleted": outcome.deleted, "skipped": outcome.skipped })),
        )
        .await;

    Ok(Json(outcome))
}
