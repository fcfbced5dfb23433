//! Student service - enrollment records and student numbers.
//!
//! Student numbers are allocated inside the creating transaction; a
//! unique-index collision from a racing create is retried with a fresh
//! sequence.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CreateStudent, Student, UpdateStudent};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{BulkDeleteResponse, Paginated, PaginationParams};

/// Student service trait for dependency injection.
#[async_trait]
pub trait StudentService: Send + Sync {
    async fn get_student(&self, id: Uuid) -> AppResult<Student>;

    async fn list_students(&self, params: &PaginationParams) -> AppResult<Paginated<Student>>;

    async fn create_student(&self, data: CreateStudent) -> AppResult<Student>;

    async fn update_student(&self, id: Uuid, changes: UpdateStudent) -> AppResult<Student>;

    /// Delete a student. Without `force`, refuses if reservations or grades
    /// reference the student.
    async fn delete_student(&self, id: Uuid, force: bool) -> AppResult<()>;

    /// Delete many students, skipping the ones a non-forced delete refuses
    async fn bulk_delete_students(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse>;
}

/// Concrete implementation of StudentService using Unit of Work.
pub struct StudentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> StudentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_course_exists(&self, course_id: Uuid) -> AppResult<()> {
        self.uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::validation("Course does not exist"))?;
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> StudentService for StudentManager<U> {
    async fn get_student(&self, id: Uuid) -> AppResult<Student> {
        self.uow
            .students()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_students(&self, params: &PaginationParams) -> AppResult<Paginated<Student>> {
        let (items, total) = self.uow.students().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn create_student(&self, data: CreateStudent) -> AppResult<Student> {
        if let Some(course_id) = data.course_id {
            self.ensure_course_exists(course_id).await?;
        }

        // Concurrent creates can draw the same student number; the unique
        // index rejects the loser, who re-reads the sequence and tries again.
        let mut attempts_left = 3;
        loop {
            let data = data.clone();
            let result = self
                .uow
                .transaction(move |ctx| {
                    Box::pin(async move { ctx.students().create_with_number(data).await })
                })
                .await;

            attempts_left -= 1;
            match result {
                Err(e) if e.is_unique_violation() && attempts_left > 0 => continue,
                other => return other,
            }
        }
    }

    async fn update_student(&self, id: Uuid, changes: UpdateStudent) -> AppResult<Student> {
        if let Some(Some(course_id)) = changes.course_id {
            self.ensure_course_exists(course_id).await?;
        }

        self.uow.students().update(id, changes).await
    }

    async fn delete_student(&self, id: Uuid, force: bool) -> AppResult<()> {
        self.uow
            .students()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if force {
                        ctx.students().cascade_delete(id).await
                    } else {
                        let dependents = ctx.students().count_dependents(id).await?;
                        if dependents > 0 {
                            return Err(AppError::has_dependents("Student"));
                        }
                        ctx.students().delete_plain(id).await
                    }
                })
            })
            .await
    }

    async fn bulk_delete_students(
        &self,
        ids: Vec<Uuid>,
        force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        let mut outcome = BulkDeleteResponse::default();

        for id in ids {
            match self.delete_student(id, force).await {
                Ok(()) => outcome.deleted += 1,
                Err(AppError::HasDependents(_)) | Err(AppError::NotFound) => outcome.skipped += 1,
                Err(other) => return Err(other),
            }
        }

        Ok(outcome)
    }
}
