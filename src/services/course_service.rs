//! Course service - degree programs and their dependent records.
//!
//! Deleting a course that still has students, subjects, or grades is
//! refused unless forced; a forced delete removes the whole subtree in
//! one transaction.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Course, CreateCourse, UpdateCourse};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{BulkDeleteResponse, Paginated, PaginationParams};

/// Course service trait for dependency injection.
#[async_trait]
pub trait CourseService: Send + Sync {
    async fn get_course(&self, id: Uuid) -> AppResult<Course>;

    async fn list_courses(&self, params: &PaginationParams) -> AppResult<Paginated<Course>>;

    async fn create_course(&self, data: CreateCourse) -> AppResult<Course>;

    async fn update_course(&self, id: Uuid, changes: UpdateCourse) -> AppResult<Course>;

    /// Delete a course. Without `force`, refuses while dependents exist.
    async fn delete_course(&self, id: Uuid, force: bool) -> AppResult<()>;

    async fn bulk_delete_courses(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse>;
}

/// Concrete implementation of CourseService using Unit of Work.
pub struct CourseManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CourseManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CourseService for CourseManager<U> {
    async fn get_course(&self, id: Uuid) -> AppResult<Course> {
        self.uow
            .courses()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_courses(&self, params: &PaginationParams) -> AppResult<Paginated<Course>> {
        let (items, total) = self.uow.courses().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn create_course(&self, data: CreateCourse) -> AppResult<Course> {
        if self.uow.courses().find_by_code(&data.code).await?.is_some() {
            return Err(AppError::conflict("Course code"));
        }

        self.uow.courses().create(data).await
    }

    async fn update_course(&self, id: Uuid, changes: UpdateCourse) -> AppResult<Course> {
        if let Some(code) = &changes.code {
            if let Some(existing) = self.uow.courses().find_by_code(code).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Course code"));
                }
            }
        }

        self.uow.courses().update(id, changes).await
    }

    async fn delete_course(&self, id: Uuid, force: bool) -> AppResult<()> {
        self.uow
            .courses()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if force {
                        ctx.courses().cascade_delete(id).await
                    } else {
                        let dependents = ctx.courses().count_dependents(id).await?;
                        if !dependents.is_empty() {
                            return Err(AppError::has_dependents("Course"));
                        }
                        ctx.courses().delete_plain(id).await
                    }
                })
            })
            .await
    }

    async fn bulk_delete_courses(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        let mut outcome = BulkDeleteResponse::default();

        for id in ids {
            match self.delete_course(id, force).await {
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

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    use crate::infra::repositories::entities::{course, student, subject};
    use crate::infra::repositories::MockCourseRepository;
    use crate::infra::Persistence;
    use crate::services::testing::StubUow;

    fn existing_course(id: Uuid, code: &str) -> Course {
        Course {
            id,
            code: code.to_string(),
            name: "BS Computer Science".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager(courses: MockCourseRepository) -> CourseManager<StubUow> {
        CourseManager::new(Arc::new(StubUow {
            courses: Arc::new(courses),
            ..StubUow::default()
        }))
    }

    #[tokio::test]
    async fn create_course_rejects_duplicate_code() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_code()
            .withf(|code| code == "BSCS")
            .returning(|code| Ok(Some(existing_course(Uuid::new_v4(), code))));

        let result = manager(courses)
            .create_course(CreateCourse {
                code: "BSCS".to_string(),
                name: "BS Computer Science".to_string(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_course_allows_keeping_own_code() {
        let id = Uuid::new_v4();
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_code()
            .returning(move |code| Ok(Some(existing_course(id, code))));
        courses
            .expect_update()
            .returning(move |id, _| Ok(existing_course(id, "BSCS")));

        let changes = UpdateCourse {
            code: Some("BSCS".to_string()),
            ..UpdateCourse::default()
        };

        assert!(manager(courses).update_course(id, changes).await.is_ok());
    }

    fn course_row(id: Uuid) -> course::Model {
        course::Model {
            id,
            code: "BSCS".to_string(),
            name: "BS Computer Science".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn count_row(n: u64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n as i64)))])
    }

    fn persistence_manager(db: MockDatabase) -> CourseManager<Persistence> {
        CourseManager::new(Arc::new(Persistence::new(Arc::new(db.into_connection()))))
    }

    #[tokio::test]
    async fn delete_without_force_is_blocked_by_dependents() {
        let id = Uuid::new_v4();
        // Lookup, then the three dependent counts inside the transaction.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course_row(id)]])
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![count_row(0)]]);

        let result = persistence_manager(db).delete_course(id, false).await;

        assert!(matches!(result, Err(AppError::HasDependents(_))));
    }

    #[tokio::test]
    async fn forced_delete_cascades_through_the_whole_subtree() {
        let id = Uuid::new_v4();
        let subject_row = subject::Model {
            id: Uuid::new_v4(),
            code: "CS101".to_string(),
            title: "Intro to Computing".to_string(),
            units: 3,
            course_id: id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let student_row = student::Model {
            id: Uuid::new_v4(),
            student_no: "2026-00001".to_string(),
            first_name: "Jose".to_string(),
            middle_name: None,
            last_name: "Rizal".to_string(),
            email: None,
            birth_date: None,
            course_id: Some(id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let deleted = MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        };

        // Lookup, subject ids, student ids; then eight deletes in
        // dependency order with the course itself last.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course_row(id)]])
            .append_query_results([vec![subject_row]])
            .append_query_results([vec![student_row]])
            .append_exec_results(vec![deleted; 8]);

        let result = persistence_manager(db).delete_course(id, true).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn update_course_rejects_code_held_by_another_course() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_code()
            .returning(|code| Ok(Some(existing_course(Uuid::new_v4(), code))));

        let changes = UpdateCourse {
            code: Some("BSIT".to_string()),
            ..UpdateCourse::default()
        };
        let result = manager(courses).update_course(Uuid::new_v4(), changes).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
