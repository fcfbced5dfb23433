//! Grade service - component scores and the derived final grade.
//!
//! Clients submit component scores only; the final grade and remarks are
//! recomputed server-side on every write. A grade row is unique per
//! (student, subject, course).

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{derive_grade, CreateGrade, Grade, GradeComponents, UpdateGrade};
use crate::errors::{AppError, AppResult};
use crate::infra::{GradeRecord, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// Grade service trait for dependency injection.
#[async_trait]
pub trait GradeService: Send + Sync {
    async fn get_grade(&self, id: Uuid) -> AppResult<Grade>;

    async fn list_grades(&self, params: &PaginationParams) -> AppResult<Paginated<Grade>>;

    /// Grades for one student, e.g. the student's own transcript view
    async fn list_grades_for_student(&self, student_id: Uuid) -> AppResult<Vec<Grade>>;

    async fn create_grade(&self, data: CreateGrade) -> AppResult<Grade>;

    /// Replace the component scores and recompute the derived pair
    async fn update_grade(&self, id: Uuid, changes: UpdateGrade) -> AppResult<Grade>;

    async fn delete_grade(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of GradeService using Unit of Work.
pub struct GradeManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> GradeManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> GradeService for GradeManager<U> {
    async fn get_grade(&self, id: Uuid) -> AppResult<Grade> {
        self.uow
            .grades()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_grades(&self, params: &PaginationParams) -> AppResult<Paginated<Grade>> {
        let (items, total) = self.uow.grades().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn list_grades_for_student(&self, student_id: Uuid) -> AppResult<Vec<Grade>> {
        self.uow
            .students()
            .find_by_id(student_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow.grades().list_by_student(student_id).await
    }

    async fn create_grade(&self, data: CreateGrade) -> AppResult<Grade> {
        let components = GradeComponents::new(data.prelim, data.midterm, data.finals);
        components.validate()?;

        self.uow
            .students()
            .find_by_id(data.student_id)
            .await?
            .ok_or_else(|| AppError::validation("Student does not exist"))?;

        let subject = self
            .uow
            .subjects()
            .find_by_id(data.subject_id)
            .await?
            .ok_or_else(|| AppError::validation("Subject does not exist"))?;

        if subject.course_id != data.course_id {
            return Err(AppError::validation(
                "Subject does not belong to the given course",
            ));
        }

        if self
            .uow
            .grades()
            .find_by_key(data.student_id, data.subject_id, data.course_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Grade"));
        }

        let (final_grade, remarks) = derive_grade(&components, self.config.missing_component_policy);

        self.uow
            .grades()
            .create(GradeRecord {
                student_id: data.student_id,
                subject_id: data.subject_id,
                course_id: data.course_id,
                components,
                final_grade,
                remarks,
            })
            .await
    }

    async fn update_grade(&self, id: Uuid, changes: UpdateGrade) -> AppResult<Grade> {
        // The payload is the full set of component scores; omitted
        // components become missing, not "unchanged".
        let components = GradeComponents::new(changes.prelim, changes.midterm, changes.finals);
        components.validate()?;

        self.get_grade(id).await?;

        let (final_grade, remarks) = derive_grade(&components, self.config.missing_component_policy);

        self.uow
            .grades()
            .update(id, components, final_grade, remarks)
            .await
    }

    async fn delete_grade(&self, id: Uuid) -> AppResult<()> {
        self.get_grade(id).await?;
        self.uow.grades().delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{Remarks, Student, Subject};
    use crate::infra::repositories::{
        MockGradeRepository, MockStudentRepository, MockSubjectRepository,
    };
    use crate::services::testing::StubUow;

    fn known_student(id: Uuid) -> Student {
        Student {
            id,
            student_no: "2026-00001".to_string(),
            first_name: "Jose".to_string(),
            middle_name: None,
            last_name: "Rizal".to_string(),
            email: None,
            birth_date: None,
            course_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn known_subject(id: Uuid, course_id: Uuid) -> Subject {
        Subject {
            id,
            code: "CS101".to_string(),
            title: "Introduction to Computing".to_string(),
            units: 3,
            course_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload(course_id: Uuid) -> CreateGrade {
        CreateGrade {
            student_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            course_id,
            prelim: Some(1.0),
            midterm: Some(1.25),
            finals: Some(1.5),
        }
    }

    fn manager(uow: StubUow) -> GradeManager<StubUow> {
        GradeManager::new(Arc::new(uow), Config::for_tests())
    }

    #[tokio::test]
    async fn create_grade_rejects_out_of_range_component() {
        let svc = manager(StubUow::default());

        let mut data = payload(Uuid::new_v4());
        data.prelim = Some(101.0);

        assert!(matches!(
            svc.create_grade(data).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_grade_rejects_subject_outside_course() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(known_student(id))));

        // Subject belongs to some other course than the payload names.
        let mut subjects = MockSubjectRepository::new();
        subjects
            .expect_find_by_id()
            .returning(|id| Ok(Some(known_subject(id, Uuid::new_v4()))));

        let svc = manager(StubUow {
            students: Arc::new(students),
            subjects: Arc::new(subjects),
            ..StubUow::default()
        });

        let result = svc.create_grade(payload(Uuid::new_v4())).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_grade_rejects_duplicate_key() {
        let course_id = Uuid::new_v4();
        let data = payload(course_id);

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(known_student(id))));

        let mut subjects = MockSubjectRepository::new();
        subjects
            .expect_find_by_id()
            .returning(move |id| Ok(Some(known_subject(id, course_id))));

        let mut grades = MockGradeRepository::new();
        grades.expect_find_by_key().returning(|student_id, subject_id, course_id| {
            Ok(Some(Grade {
                id: Uuid::new_v4(),
                student_id,
                subject_id,
                course_id,
                prelim: Some(1.0),
                midterm: Some(1.0),
                finals: Some(1.0),
                final_grade: Some(1.0),
                remarks: Some(Remarks::Passed),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let svc = manager(StubUow {
            students: Arc::new(students),
            subjects: Arc::new(subjects),
            grades: Arc::new(grades),
            ..StubUow::default()
        });

        assert!(matches!(
            svc.create_grade(data).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn update_grade_recomputes_derived_pair() {
        let id = Uuid::new_v4();

        let mut grades = MockGradeRepository::new();
        grades.expect_find_by_id().returning(|id| {
            Ok(Some(Grade {
                id,
                student_id: Uuid::new_v4(),
                subject_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
                prelim: Some(1.0),
                midterm: Some(1.0),
                finals: Some(1.0),
                final_grade: Some(1.0),
                remarks: Some(Remarks::Passed),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        grades
            .expect_update()
            // 0.3*4.0 + 0.3*4.0 + 0.4*4.0 = 4.0, over the 3.0 threshold
            .withf(|_, _, final_grade, remarks| {
                *final_grade == Some(4.0) && *remarks == Some(Remarks::Failed)
            })
            .returning(|id, components, final_grade, remarks| {
                Ok(Grade {
                    id,
                    student_id: Uuid::new_v4(),
                    subject_id: Uuid::new_v4(),
                    course_id: Uuid::new_v4(),
                    prelim: components.prelim,
                    midterm: components.midterm,
                    finals: components.finals,
                    final_grade,
                    remarks,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let svc = manager(StubUow {
            grades: Arc::new(grades),
            ..StubUow::default()
        });

        let updated = svc
            .update_grade(
                id,
                UpdateGrade {
                    prelim: Some(4.0),
                    midterm: Some(4.0),
                    finals: Some(4.0),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.remarks, Some(Remarks::Failed));
    }
}
