//! Invitation handlers.
//!
//! Issuing, listing, and revoking are admin operations; verification and
//! completion are public since the recipient has no session yet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{InvitationResponse, NewAuditEntry, UserRole};
use crate::errors::AppResult;
use crate::services::CompleteInvite;
use crate::types::{MessageResponse, NoContent, Paginated, PaginationParams};

/// Invitation creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInviteRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "encoder@school.edu")]
    pub email: String,
    pub role: UserRole,
}

/// Invitation completion request. Only the token and password are
/// required; names may be filled in later through user management.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteInviteRequest {
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Freshly issued invitation; the only place the raw token appears
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedInviteResponse {
    #[serde(flatten)]
    pub invitation: InvitationResponse,
    pub token: String,
}

/// Verification result: which email the token belongs to
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyInviteResponse {
    pub valid: bool,
    pub email: String,
    pub role: UserRole,
}

/// Public redemption routes, mounted under `/auth` (no session)
pub fn invite_public_routes() -> Router<AppState> {
    Router::new()
        .route("/verify-invite/:token", get(verify_invite))
        .route("/complete-invite", post(complete_invite))
}

/// Admin invitation management routes
pub fn invite_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invites).post(create_invite))
        .route("/:id", delete(revoke_invite))
}

/// Issue an invitation
#[utoipa::path(
    post,
    path = "/invitations",
    tag = "Invitations",
    request_body = CreateInviteRequest,
    responses(
        (status = 201, description = "Invitation issued", body = IssuedInviteResponse),
        (status = 409, description = "A user with this email already exists")
    )
)]
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateInviteRequest>,
) -> AppResult<(StatusCode, Json<IssuedInviteResponse>)> {
    let invitation = state
        .services
        .invites()
        .create_invite(payload.email, payload.role, current.id)
        .await?;

    state
        .services
        .audit()
        .record(
            NewAuditEntry::new(&current.email, "create", "invitation")
                .entity_id(invitation.id)
                .details(json!({ "email": invitation.email, "role": invitation.role.as_str() })),
        )
        .await;

    let token = invitation.token.clone();
    let response = IssuedInviteResponse {
        invitation: InvitationResponse::from(invitation),
        token,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Check an invitation token
#[utoipa::path(
    get,
    path = "/auth/verify-invite/{token}",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Token is valid", body = VerifyInviteResponse),
        (status = 404, description = "Unknown token"),
        (status = 400, description = "Invitation expired")
    )
)]
pub async fn verify_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<VerifyInviteResponse>> {
    let invitation = state.services.invites().verify_invite(&token).await?;

    Ok(Json(VerifyInviteResponse {
        valid: true,
        email: invitation.email,
        role: invitation.role,
    }))
}

/// Redeem an invitation and create the account
#[utoipa::path(
    post,
    path = "/auth/complete-invite",
    tag = "Invitations",
    request_body = CompleteInviteRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 404, description = "Unknown or already used token"),
        (status = 400, description = "Invitation expired"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn complete_invite(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CompleteInviteRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state
        .services
        .invites()
        .complete_invite(CompleteInvite {
            token: payload.token,
            password: payload.password,
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Account created")),
    ))
}

/// List pending invitations
#[utoipa::path(
    get,
    path = "/invitations",
    tag = "Invitations",
    params(PaginationParams),
    responses((status = 200, description = "Invitations page"))
)]
pub async fn list_invites(
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<PaginationParams>,
) -> AppResult<Json<Paginated<InvitationResponse>>> {
    let page = state.services.invites().list_invites(&params).await?;

    Ok(Json(page.map(InvitationResponse::from)))
}

/// Revoke a pending invitation
#[utoipa::path(
    delete,
    path = "/invitations/{id}",
    tag = "Invitations",
    params(("id" = Uuid, Path, description = "Invitation id")),
    responses(
        (status = 204, description = "Invitation revoked"),
        (status = 404, description = "Invitation not found")
    )
)]
pub async fn revoke_invite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.invites().revoke_invite(id).await?;

    state
        .services
        .audit()
        .record(NewAuditEntry::new(&current.email, "revoke", "invitation").entity_id(id))
        .await;

    Ok(NoContent)
}
