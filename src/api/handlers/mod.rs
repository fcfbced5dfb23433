//! HTTP request handlers.

pub mod audit_handler;
pub mod auth_handler;
pub mod course_handler;
pub mod grade_handler;
pub mod invite_handler;
pub mod reservation_handler;
pub mod student_handler;
pub mod subject_handler;
pub mod user_handler;

pub use audit_handler::audit_routes;
pub use auth_handler::{account_routes, auth_routes};
pub use course_handler::course_routes;
pub use grade_handler::grade_routes;
pub use invite_handler::{invite_admin_routes, invite_public_routes};
pub use reservation_handler::reservation_routes;
pub use student_handler::student_routes;
pub use subject_handler::subject_routes;
pub use user_handler::user_routes;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// `?force=true` switches a guarded delete into a cascading one
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ForceParams {
    #[serde(default)]
    pub force: bool,
}

/// Bulk delete request shared by students, courses, and subjects
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub force: bool,
}
