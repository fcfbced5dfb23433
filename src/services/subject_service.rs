//! Subject service - course offerings.
//!
//! A subject is unique per course by code and title. Deletion follows the
//! same guarded/forced pattern as courses.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CreateSubject, Subject, UpdateSubject};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{BulkDeleteResponse, Paginated, PaginationParams};

/// Subject service trait for dependency injection.
#[async_trait]
pub trait SubjectService: Send + Sync {
    async fn get_subject(&self, id: Uuid) -> AppResult<Subject>;

    async fn list_subjects(&self, params: &PaginationParams) -> AppResult<Paginated<Subject>>;

    async fn create_subject(&self, data: CreateSubject) -> AppResult<Subject>;

    async fn update_subject(&self, id: Uuid, changes: UpdateSubject) -> AppResult<Subject>;

    /// Delete a subject. Without `force`, refuses while reservations or
    /// grades reference it.
    async fn delete_subject(&self, id: Uuid, force: bool) -> AppResult<()>;

    async fn bulk_delete_subjects(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse>;
}

/// Concrete implementation of SubjectService using Unit of Work.
pub struct SubjectManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SubjectManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> SubjectService for SubjectManager<U> {
    async fn get_subject(&self, id: Uuid) -> AppResult<Subject> {
        self.uow
            .subjects()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_subjects(&self, params: &PaginationParams) -> AppResult<Paginated<Subject>> {
        let (items, total) = self.uow.subjects().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn create_subject(&self, data: CreateSubject) -> AppResult<Subject> {
        self.uow
            .courses()
            .find_by_id(data.course_id)
            .await?
            .ok_or_else(|| AppError::validation("Course does not exist"))?;

        if self
            .uow
            .subjects()
            .find_duplicate(data.course_id, &data.code, &data.title)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Subject"));
        }

        self.uow.subjects().create(data).await
    }

    async fn update_subject(&self, id: Uuid, changes: UpdateSubject) -> AppResult<Subject> {
        let existing = self.get_subject(id).await?;

        if let Some(course_id) = changes.course_id {
            self.uow
                .courses()
                .find_by_id(course_id)
                .await?
                .ok_or_else(|| AppError::validation("Course does not exist"))?;
        }

        // Re-check uniqueness against the values the row will end up with.
        let course_id = changes.course_id.unwrap_or(existing.course_id);
        let code = changes.code.clone().unwrap_or(existing.code);
        let title = changes.title.clone().unwrap_or(existing.title);

        if let Some(duplicate) = self
            .uow
            .subjects()
            .find_duplicate(course_id, &code, &title)
            .await?
        {
            if duplicate.id != id {
                return Err(AppError::conflict("Subject"));
            }
        }

        self.uow.subjects().update(id, changes).await
    }

    async fn delete_subject(&self, id: Uuid, force: bool) -> AppResult<()> {
        self.uow
            .subjects()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if force {
                        ctx.subjects().cascade_delete(id).await
                    } else {
                        let dependents = ctx.subjects().count_dependents(id).await?;
                        if dependents.reservations > 0 || dependents.grades > 0 {
                            return Err(AppError::has_dependents("Subject"));
                        }
                        ctx.subjects().delete_plain(id).await
                    }
                })
            })
            .await
    }

    async fn bulk_delete_subjects(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        let mut outcome = BulkDeleteResponse::default();

        for id in ids {
            match self.delete_subject(id, force).await {
                Ok(()) => outcome.deleted += 1,
                Err(AppError::HasDependents(_)) | Err(AppError::NotFound) => outcome.skipped += 1,
                Err(other) => return Err(other),
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::Course;
    use crate::infra::repositories::{MockCourseRepository, MockSubjectRepository};
    use crate::services::testing::StubUow;

    fn existing_subject(id: Uuid, course_id: Uuid) -> Subject {
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

    fn known_course(id: Uuid) -> Course {
        Course {
            id,
            code: "BSCS".to_string(),
            name: "BS Computer Science".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_subject_rejects_unknown_course() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_by_id().returning(|_| Ok(None));

        let svc = SubjectManager::new(Arc::new(StubUow {
            courses: Arc::new(courses),
            ..StubUow::default()
        }));

        let result = svc
            .create_subject(CreateSubject {
                code: "CS101".to_string(),
                title: "Introduction to Computing".to_string(),
                units: 3,
                course_id: Uuid::new_v4(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_subject_rejects_duplicate_offering() {
        let course_id = Uuid::new_v4();

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(|id| Ok(Some(known_course(id))));

        let mut subjects = MockSubjectRepository::new();
        subjects
            .expect_find_duplicate()
            .returning(|course_id, _, _| Ok(Some(existing_subject(Uuid::new_v4(), course_id))));

        let svc = SubjectManager::new(Arc::new(StubUow {
            courses: Arc::new(courses),
            subjects: Arc::new(subjects),
            ..StubUow::default()
        }));

        let result = svc
            .create_subject(CreateSubject {
                code: "CS101".to_string(),
                title: "Introduction to Computing".to_string(),
                units: 3,
                course_id,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_subject_checks_uniqueness_against_merged_values() {
        let id = Uuid::new_v4();
        let course_id = Uuid::new_v4();

        let mut subjects = MockSubjectRepository::new();
        subjects
            .expect_find_by_id()
            .returning(move |id| Ok(Some(existing_subject(id, course_id))));
        // The rename collides with a different subject in the same course.
        subjects
            .expect_find_duplicate()
            .withf(move |cid, code, _| *cid == course_id && code == "CS101")
            .returning(move |cid, _, _| Ok(Some(existing_subject(Uuid::new_v4(), cid))));

        let svc = SubjectManager::new(Arc::new(StubUow {
            subjects: Arc::new(subjects),
            ..StubUow::default()
        }));

        let changes = UpdateSubject {
            title: Some("Intro to Computing".to_string()),
            ..UpdateSubject::default()
        };
        let result = svc.update_subject(id, changes).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
