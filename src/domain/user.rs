//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_ENCODER, ROLE_STUDENT};
use crate::errors::{AppError, AppResult};

/// Console roles. Closed enumeration: authorization checkpoints match
/// exhaustively on this, never on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Encoder,
    Student,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Whether this role may use the admin console at all.
    /// Student accounts exist for portal access but are rejected here.
    pub fn can_use_console(&self) -> bool {
        match self {
            UserRole::Admin | UserRole::Encoder => true,
            UserRole::Student => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Encoder => ROLE_ENCODER,
            UserRole::Student => ROLE_STUDENT,
        }
    }

    /// Parse a stored role value; unknown values are rejected
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_ENCODER => Ok(UserRole::Encoder),
            ROLE_STUDENT => Ok(UserRole::Student),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    /// Deactivated accounts keep their row but cannot log in
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User creation data transfer object (admin-created accounts)
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

/// User update data transfer object
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    /// Set false to deactivate, true to reactivate
    pub is_active: Option<bool>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_form() {
        for role in [UserRole::Admin, UserRole::Encoder, UserRole::Student] {
            assert_eq!(UserRole::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(UserRole::parse("superuser").is_err());
    }

    #[test]
    fn student_role_cannot_use_console() {
        assert!(UserRole::Admin.can_use_console());
        assert!(UserRole::Encoder.can_use_console());
        assert!(!UserRole::Student.can_use_console());
    }
}
