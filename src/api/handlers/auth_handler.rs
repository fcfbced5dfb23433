//! Authentication handlers: login, logout, session introspection.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{session_user, CurrentUser};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "registrar@school.edu")]
    pub email: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub new_password: String,
}

/// Login result: confirmation message plus the authenticated account
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Routes that need a session but no particular role
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/change-password", post(change_password))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (user, token) = state
        .services
        .auth()
        .login(payload.email, payload.password)
        .await?;

    let jar = jar.add(state.cookies.session_cookie(token));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cleared"))
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(state.cookies.removal_cookie());

    (jar, Json(MessageResponse::new("Logged out")))
}

/// Current session's user, or null when not logged in
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses((status = 200, description = "Current user or null", body = Option<UserResponse>))
)]
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<Option<UserResponse>>> {
    let Some(current) = session_user(&state, &jar) else {
        return Ok(Json(None));
    };

    // The account may have been removed or deactivated since the token
    // was issued.
    let user = match state.services.users().get_user(current.id).await {
        Ok(user) if user.is_active => Some(UserResponse::from(user)),
        _ => None,
    };

    Ok(Json(user))
}

/// Change the caller's own password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "Authentication",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .auth()
        .change_password(current.id, payload.current_password, payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed")))
}
