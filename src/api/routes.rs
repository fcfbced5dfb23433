//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, audit_routes, auth_routes, course_routes, grade_routes, invite_admin_routes,
    invite_public_routes, reservation_routes, student_routes, subject_routes, user_routes,
};
use super::middleware::{admin_middleware, auth_middleware, console_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured.
///
/// Route gating: `/auth/*` and invitation redemption are public; resource
/// routes require an admin or encoder session; `/users`, `/invitations`
/// management and `/audit` require admin.
pub fn create_router(state: AppState) -> Router {
    let admin = |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
    };
    let console = |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            console_middleware,
        ))
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(
            "/auth",
            auth_routes().merge(invite_public_routes()).merge(
                account_routes().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
            ),
        )
        .nest("/invitations", admin(invite_admin_routes()))
        .nest("/users", admin(user_routes()))
        .nest("/audit", admin(audit_routes()))
        .nest("/students", console(student_routes()))
        .nest("/courses", console(course_routes()))
        .nest("/subjects", console(subject_routes()))
        .nest("/grades", console(grade_routes()))
        .nest("/reservations", console(reservation_routes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "SIS admin API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                error: Some(e.to_string()),
            }),
        ),
    }
}
