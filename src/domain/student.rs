//! Student domain entity and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Student domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    /// Generated registrar number, e.g. `2026-00042`
    pub student_no: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub course_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudent {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub course_id: Option<Uuid>,
}

/// Absent fields are left unchanged; explicit `null` clears the column.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudent {
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "crate::types::double_option")]
    pub middle_name: Option<Option<String>>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "crate::types::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::types::double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::types::double_option")]
    pub course_id: Option<Option<Uuid>>,
}

/// Build a student number from enrollment year and a 1-based sequence.
pub fn format_student_no(year: i32, sequence: u64) -> String {
    format!("{}-{:05}", year, sequence)
}

/// Sequence following the highest number issued for `year`.
///
/// Derived from the maximum rather than a row count so numbers freed by
/// deletions are never reissued.
pub fn next_student_sequence(last_student_no: Option<&str>, year: i32) -> u64 {
    let prefix = format!("{}-", year);
    last_student_no
        .and_then(|no| no.strip_prefix(prefix.as_str()))
        .and_then(|sequence| sequence.parse::<u64>().ok())
        .map_or(1, |sequence| sequence + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_no_is_zero_padded() {
        assert_eq!(format_student_no(2026, 42), "2026-00042");
        assert_eq!(format_student_no(2026, 123456), "2026-123456");
    }

    #[test]
    fn sequence_starts_at_one_for_a_fresh_year() {
        assert_eq!(next_student_sequence(None, 2026), 1);
    }

    #[test]
    fn sequence_resumes_past_the_highest_issued_number() {
        // Rows 1..=6 may have been deleted; the next number still moves on.
        assert_eq!(next_student_sequence(Some("2026-00007"), 2026), 8);
    }

    #[test]
    fn sequence_ignores_numbers_from_another_year() {
        assert_eq!(next_student_sequence(Some("2025-00042"), 2026), 1);
    }
}
