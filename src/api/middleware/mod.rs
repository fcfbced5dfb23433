//! API middleware.

mod auth;

pub use auth::{
    admin_middleware, auth_middleware, console_middleware, session_user, CurrentUser,
};
