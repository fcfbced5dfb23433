//! Subject reservation handlers.

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
use crate::domain::{CreateReservation, NewAuditEntry, SubjectReservation, UpdateReservation};
use crate::errors::AppResult;
use crate::types::{NoContent, Paginated, PaginationParams};

/// Reservation routes (admin and encoder)
pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route(
            "/:id",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
}

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "Reservations",
    params(PaginationParams),
    responses((status = 200, description = "Reservations page"))
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<SubjectReservation>>> {
    let page = state
        .services
        .reservations()
        .list_reservations(&params)
        .await?;

    Ok(Json(page))
}

/// Get one reservation
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation found", body = SubjectReservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubjectReservation>> {
    let reservation = state.services.reservations().get_reservation(id).await?;

    Ok(Json(reservation))
}

/// Reserve a subject for a student
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "Reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = SubjectReservation),
        (status = 409, description = "Student already holds a reservation for this subject")
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<SubjectReservation>)> {
    let reservation = state
        .services
        .reservations()
        .create_reservation(payload)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "reservation")
                .entity_id(reservation.id)
                .details(json!({
                    "studentId": reservation.student_id,
                    "subjectId": reservation.subject_id,
                })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Update a reservation's status
#[utoipa::path(
    put,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation id")),
    request_body = UpdateReservation,
    responses(
        (status = 200, description = "Reservation updated", body = SubjectReservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn update_reservation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateReservation>,
) -> AppResult<Json<SubjectReservation>> {
    let reservation = state
        .services
        .reservations()
        .update_reservation_status(id, changes.status)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "update", "reservation")
                .entity_id(reservation.id)
                .details(json!({ "status": reservation.status.as_str() })),
        )
        .await;

    Ok(Json(reservation))
}

/// Delete a reservation
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.reservations().delete_reservation(id).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "delete", "reservation").entity_id(id))
        .await;

    Ok(NoContent)
}
