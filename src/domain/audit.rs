//! Audit log domain entity.
//!
//! One row per successful mutation through the API: who did what to which
//! record. Entries are append-only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_email: String,
    /// Action verb, e.g. `create`, `update`, `delete`, `force-delete`
    pub action: String,
    /// Entity kind, e.g. `student`, `course`
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a new entry
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_email: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(
        actor_email: impl Into<String>,
        action: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            actor_email: actor_email.into(),
            action: action.into(),
            entity: entity.into(),
            entity_id: None,
            details: None,
        }
    }

    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
