//! Grade domain entity and the grade computation policy.
//!
//! The final grade is a weighted average of prelim, midterm and finals
//! (30/30/40), rounded half-up to two decimals. Remarks use the inverted
//! 1.0–5.0 scale the school runs on: lower is better, and anything at or
//! below 3.0 passes. That polarity is load-bearing and must not be
//! "corrected" to an ascending scale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    FINALS_WEIGHT, GRADE_COMPONENT_MAX, GRADE_COMPONENT_MIN, MIDTERM_WEIGHT, MissingComponentPolicy,
    PASSING_GRADE, PRELIM_WEIGHT,
};
use crate::errors::{AppError, AppResult};

/// Derived pass/fail label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Remarks {
    Passed,
    Failed,
}

impl Remarks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Remarks::Passed => "Passed",
            Remarks::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Passed" => Some(Remarks::Passed),
            "Failed" => Some(Remarks::Failed),
            _ => None,
        }
    }

    /// Derive remarks from a final grade. Inverted scale: at or below the
    /// passing threshold is a pass.
    pub fn from_final_grade(final_grade: f64) -> Self {
        if final_grade <= PASSING_GRADE {
            Remarks::Passed
        } else {
            Remarks::Failed
        }
    }
}

impl std::fmt::Display for Remarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three grading-period components of a grade row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeComponents {
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub finals: Option<f64>,
}

impl GradeComponents {
    pub fn new(prelim: Option<f64>, midterm: Option<f64>, finals: Option<f64>) -> Self {
        Self {
            prelim,
            midterm,
            finals,
        }
    }

    /// Reject components outside the accepted range
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("prelim", self.prelim),
            ("midterm", self.midterm),
            ("finals", self.finals),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || !(GRADE_COMPONENT_MIN..=GRADE_COMPONENT_MAX).contains(&v) {
                    return Err(AppError::validation(format!(
                        "{} must be between {} and {}",
                        name, GRADE_COMPONENT_MIN, GRADE_COMPONENT_MAX
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.prelim.is_some() && self.midterm.is_some() && self.finals.is_some()
    }
}

/// Compute the final grade from the components under the given policy.
///
/// Returns `None` when the policy is `Strict` and a component is missing;
/// otherwise missing components count as 0. The weighted sum is taken in
/// percent units (30p + 30m + 40f) and rounded half-up there, which keeps
/// the two-decimal rounding exact for quarter-point component values.
pub fn compute_final_grade(
    components: &GradeComponents,
    policy: MissingComponentPolicy,
) -> Option<f64> {
    if policy == MissingComponentPolicy::Strict && !components.is_complete() {
        return None;
    }

    let prelim = components.prelim.unwrap_or(0.0);
    let midterm = components.midterm.unwrap_or(0.0);
    let finals = components.finals.unwrap_or(0.0);

    let weighted = PRELIM_WEIGHT * prelim + MIDTERM_WEIGHT * midterm + FINALS_WEIGHT * finals;
    Some(weighted.round() / 100.0)
}

/// Recompute the derived pair (final grade, remarks) for a grade row.
/// Clients never set these directly.
pub fn derive(
    components: &GradeComponents,
    policy: MissingComponentPolicy,
) -> (Option<f64>, Option<Remarks>) {
    match compute_final_grade(components, policy) {
        Some(final_grade) => (Some(final_grade), Some(Remarks::from_final_grade(final_grade))),
        None => (None, None),
    }
}

/// Grade domain entity. One row per (student, subject, course).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub course_id: Uuid,
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub finals: Option<f64>,
    pub final_grade: Option<f64>,
    pub remarks: Option<Remarks>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grade {
    pub fn components(&self) -> GradeComponents {
        GradeComponents::new(self.prelim, self.midterm, self.finals)
    }
}

/// Grade creation payload. `finalGrade`/`remarks` are absent on purpose.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrade {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub course_id: Uuid,
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub finals: Option<f64>,
}

/// Grade update payload: only components are writable.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGrade {
    pub prelim: Option<f64>,
    pub midterm: Option<f64>,
    pub finals: Option<f64>,
}
