//! Course repository, including dependent-row counting for delete guards.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{
    course::{self, Entity as CourseEntity},
    grade::{self, Entity as GradeEntity},
    reservation::{self, Entity as ReservationEntity},
    student::{self, Entity as StudentEntity},
    subject::{self, Entity as SubjectEntity},
};
use crate::domain::{Course, CourseDependents, CreateCourse, UpdateCourse};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Course repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Course>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Course>, u64)>;

    async fn create(&self, data: CreateCourse) -> AppResult<Course>;

    async fn update(&self, id: Uuid, changes: UpdateCourse) -> AppResult<Course>;

    /// Count rows that would block a non-forced delete
    async fn count_dependents(&self, id: Uuid) -> AppResult<CourseDependents>;
}

/// SeaORM-backed implementation of CourseRepository.
pub struct CourseStore {
    db: Arc<DatabaseConnection>,
}

impl CourseStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Course::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Course>> {
        let result = CourseEntity::find()
            .filter(course::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await?;
        Ok(result.map(Course::from))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Course>, u64)> {
        let mut query = CourseEntity::find().order_by_asc(course::Column::Code);

        if let Some(term) = params.search_term() {
            query = query.filter(
                Condition::any()
                    .add(course::Column::Code.contains(term))
                    .add(course::Column::Name.contains(term)),
            );
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Course::from).collect(), total))
    }

    async fn create(&self, data: CreateCourse) -> AppResult<Course> {
        let now = chrono::Utc::now();
        let active_model = course::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(data.code),
            name: Set(data.name),
            description: Set(data.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(Course::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateCourse) -> AppResult<Course> {
        let existing = CourseEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: course::ActiveModel = existing.into();

        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(Course::from(model))
    }

    async fn count_dependents(&self, id: Uuid) -> AppResult<CourseDependents> {
        count_dependents(self.db.as_ref(), id).await
    }
}

// Shared query functions, usable inside transactions.

pub(crate) async fn count_dependents<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<CourseDependents> {
    let students = StudentEntity::find()
        .filter(student::Column::CourseId.eq(id))
        .count(conn)
        .await?;
    let subjects = SubjectEntity::find()
        .filter(subject::Column::CourseId.eq(id))
        .count(conn)
        .await?;
    let grades = GradeEntity::find()
        .filter(grade::Column::CourseId.eq(id))
        .count(conn)
        .await?;

    Ok(CourseDependents {
        students,
        subjects,
        grades,
    })
}

/// Delete a course and every dependent row in one pass. Must run inside a
/// transaction; ordering respects the foreign keys.
pub(crate) async fn cascade_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let subject_ids: Vec<Uuid> = SubjectEntity::find()
        .filter(subject::Column::CourseId.eq(id))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    GradeEntity::delete_many()
        .filter(grade::Column::CourseId.eq(id))
        .exec(conn)
        .await?;

    if !subject_ids.is_empty() {
        // Grades under the course's subjects may reference another course row
        GradeEntity::delete_many()
            .filter(grade::Column::SubjectId.is_in(subject_ids.clone()))
            .exec(conn)
            .await?;
        ReservationEntity::delete_many()
            .filter(reservation::Column::SubjectId.is_in(subject_ids))
            .exec(conn)
            .await?;
    }

    let student_ids: Vec<Uuid> = StudentEntity::find()
        .filter(student::Column::CourseId.eq(id))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    if !student_ids.is_empty() {
        GradeEntity::delete_many()
            .filter(grade::Column::StudentId.is_in(student_ids.clone()))
            .exec(conn)
            .await?;
        ReservationEntity::delete_many()
            .filter(reservation::Column::StudentId.is_in(student_ids))
            .exec(conn)
            .await?;
    }

    StudentEntity::delete_many()
        .filter(student::Column::CourseId.eq(id))
        .exec(conn)
        .await?;
    SubjectEntity::delete_many()
        .filter(subject::Column::CourseId.eq(id))
        .exec(conn)
        .await?;

    let result = CourseEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Plain delete for a course with no dependents.
pub(crate) async fn delete_plain<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let result = CourseEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
