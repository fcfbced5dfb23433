//! Invitation domain entity.
//!
//! An invitation is a single-use, time-boxed token authorizing creation of
//! exactly one account with a predetermined email and role. It is deleted
//! when consumed or revoked; expiry is checked at verification time.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::INVITE_TOKEN_BYTES;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// Invitation domain entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub email: String,
    pub role: UserRole,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Fail with the lifecycle error when the invitation is past its expiry
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_expired(now) {
            Err(AppError::InvitationExpired)
        } else {
            Ok(())
        }
    }
}

/// Generate an unguessable invitation token from the OS RNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Invitation listing response (token withheld; only the invite email
/// carries the token out of band)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub expired: bool,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        let expired = invitation.is_expired(Utc::now());
        Self {
            id: invitation.id,
            email: invitation.email,
            role: invitation.role,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
            expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(expires_at: DateTime<Utc>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            token: generate_token(),
            email: "new.encoder@school.edu".to_string(),
            role: UserRole::Encoder,
            invited_by: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_is_checked_against_now() {
        let now = Utc::now();
        let live = invitation(now + Duration::hours(1));
        let dead = invitation(now - Duration::seconds(1));

        assert!(live.ensure_valid(now).is_ok());
        assert!(matches!(
            dead.ensure_valid(now),
            Err(AppError::InvitationExpired)
        ));
        // Repeated checks on an expired invitation never become valid
        assert!(dead.ensure_valid(now + Duration::hours(1)).is_err());
    }

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), INVITE_TOKEN_BYTES * 2);
        assert_ne!(a, b);
    }
}
