//! Audit log handlers (admin only).

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::domain::AuditEntry;
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

/// Audit log routes
pub fn audit_routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_entries))
}

/// List audit entries, newest first
#[utoipa::path(
    get,
    path = "/audit",
    tag = "Audit",
    params(PaginationParams),
    responses((status = 200, description = "Audit log page"))
)]
pub async fn list_audit_entries(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AuditEntry>>> {
    let page = state.services.audit().list_entries(&params).await?;

    Ok(Json(page))
}
