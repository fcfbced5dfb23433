//! Session authentication middleware.
//!
//! The session rides in an httpOnly cookie. `auth_middleware` admits any
//! valid session; `console_middleware` additionally rejects the student
//! role, which has no business in the resource endpoints.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::UserRole;
use crate::errors::AppError;

/// Authenticated user extracted from the session cookie
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Resolve a session cookie into a CurrentUser, if present and valid.
pub fn session_user(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let token = jar.get(SESSION_COOKIE_NAME)?.value().to_string();
    let claims = state.services.auth().verify_token(&token).ok()?;
    let role = claims.role().ok()?;

    Some(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role,
    })
}

/// Session authentication middleware.
///
/// Validates the session cookie and injects CurrentUser into the request
/// extensions. Any authenticated role passes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = session_user(&state, &jar).ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Console access middleware: admin and encoder only.
pub async fn console_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = session_user(&state, &jar).ok_or(AppError::Unauthorized)?;

    if !current_user.role.can_use_console() {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Admin-only middleware for user management, invitations, and the audit log.
pub async fn admin_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = session_user(&state, &jar).ok_or(AppError::Unauthorized)?;

    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_follows_role() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "e@x.y".to_string(),
            role: UserRole::Encoder,
        };
        assert!(!user.is_admin());
        assert!(user.role.can_use_console());
    }
}
