//! Subject domain entity and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subject domain entity. `(course_id, code, title)` is unique.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub units: i32,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubject {
    pub code: String,
    pub title: String,
    pub units: i32,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubject {
    pub code: Option<String>,
    pub title: Option<String>,
    pub units: Option<i32>,
    pub course_id: Option<Uuid>,
}

/// Counts of rows that block a non-forced subject delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectDependents {
    pub reservations: u64,
    pub grades: u64,
}

impl SubjectDependents {
    pub fn is_empty(&self) -> bool {
        self.reservations == 0 && self.grades == 0
    }
}
