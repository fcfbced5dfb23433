//! Subject handlers.

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
use crate::domain::{CreateSubject, NewAuditEntry, Subject, UpdateSubject};
use crate::errors::AppResult;
use crate::types::{BulkDeleteResponse, NoContent, Paginated, PaginationParams};

/// Subject creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, message = "Subject code is required"))]
    #[schema(example = "IT101")]
    pub code: String,
    #[validate(length(min = 1, message = "Subject title is required"))]
    #[schema(example = "Introduction to Computing")]
    pub title: String,
    #[validate(range(min = 1, max = 12, message = "Units must be between 1 and 12"))]
    pub units: i32,
    pub course_id: Uuid,
}

/// Subject routes (admin and encoder)
pub fn subject_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route("/:id", get(get_subject).put(update_subject).delete(delete_subject))
        .route("/bulk-delete", post(bulk_delete_subjects))
}

/// List subjects
#[utoipa::path(
    get,
    path = "/subjects",
    tag = "Subjects",
    params(PaginationParams),
    responses((status = 200, description = "Subjects page"))
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Subject>>> {
    let page = state.services.subjects().list_subjects(&params).await?;

    Ok(Json(page))
}

/// Get one subject
#[utoipa::path(
    get,
    path = "/subjects/{id}",
    tag = "Subjects",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject found", body = Subject),
        (status = 404, description = "Subject not found")
    )
)]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Subject>> {
    let subject = state.services.subjects().get_subject(id).await?;

    Ok(Json(subject))
}

/// Create a subject under a course
#[utoipa::path(
    post,
    path = "/subjects",
    tag = "Subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 409, description = "Duplicate subject in the course")
    )
)]
pub async fn create_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateSubjectRequest>,
) -> AppResult<(StatusCode, Json<Subject>)> {
    let subject = state
        .services
        .subjects()
        .create_subject(CreateSubject {
            code: payload.code,
            title: payload.title,
            units: payload.units,
            course_id: payload.course_id,
        })
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "subject")
                .entity_id(subject.id)
                .details(json!({ "code": subject.code, "courseId": subject.course_id })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Update a subject
#[utoipa::path(
    put,
    path = "/subjects/{id}",
    tag = "Subjects",
    params(("id" = Uuid, Path, description = "Subject id")),
    request_body = UpdateSubject,
    responses(
        (status = 200, description = "Subject updated", body = Subject),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Duplicate subject in the course")
    )
)]
pub async fn update_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateSubject>,
) -> AppResult<Json<Subject>> {
    let subject = state.services.subjects().update_subject(id, changes).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "update", "subject").entity_id(subject.id))
        .await;

    Ok(Json(subject))
}

/// Delete a subject; `?force=true` removes its reservations and grades
#[utoipa::path(
    delete,
    path = "/subjects/{id}",
    tag = "Subjects",
    params(
        ("id" = Uuid, Path, description = "Subject id"),
        ForceParams
    ),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Subject has reservations or grades")
    )
)]
pub async fn delete_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<ForceParams>,
) -> AppResult<NoContent> {
    state
        .services
        .subjects()
        .delete_subject(id, params.force)
        .await?;

    let action = if params.force { "force-delete" } else { "delete" };
    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, action, "subject").entity_id(id))
        .await;

    Ok(NoContent)
}

/// Delete many subjects, skipping blocked ones
#[utoipa::path(
    post,
    path = "/subjects/bulk-delete",
    tag = "Subjects",
    request_body = BulkDeleteRequest,
    responses((status = 200, description = "Deletion counts", body = BulkDeleteResponse))
)]
pub async fn bulk_delete_subjects(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let outcome = state
        .services
        .subjects()
        .bulk_delete_subjects(payload.ids, payload.force)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "bulk-delete", "subject")
                .details(json!({ "deleted": outcome.deleted, "skipped": outcome.skipped })),
        )
        .await;

    Ok(Json(outcome))
}
