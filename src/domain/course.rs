//! Course and subject domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Course domain entity. Owns students, subjects and grades by foreign key.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::types::double_option")]
    pub description: Option<Option<String>>,
}

/// Counts of rows that block a non-forced course delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseDependents {
    pub students: u64,
    pub subjects: u64,
    pub grades: u64,
}

impl CourseDependents {
    pub fn is_empty(&self) -> bool {
        self.students == 0 && self.subjects == 0 && self.grades == 0
    }
}
