//! Subject repository, including dependent-row counting for delete guards.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{
    grade::{self, Entity as GradeEntity},
    reservation::{self, Entity as ReservationEntity},
    subject::{self, Entity as SubjectEntity},
};
use crate::domain::{CreateSubject, Subject, SubjectDependents, UpdateSubject};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Subject repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subject>>;

    /// Uniqueness check for `(course_id, code, title)`
    async fn find_duplicate(
        &self,
        course_id: Uuid,
        code: &str,
        title: &str,
    ) -> AppResult<Option<Subject>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Subject>, u64)>;

    async fn create(&self, data: CreateSubject) -> AppResult<Subject>;

    async fn update(&self, id: Uuid, changes: UpdateSubject) -> AppResult<Subject>;

    /// Count rows that would block a non-forced delete
    async fn count_dependents(&self, id: Uuid) -> AppResult<SubjectDependents>;
}

/// SeaORM-backed implementation of SubjectRepository.
pub struct SubjectStore {
    db: Arc<DatabaseConnection>,
}

impl SubjectStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubjectRepository for SubjectStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subject>> {
        let result = SubjectEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Subject::from))
    }

    async fn find_duplicate(
        &self,
        course_id: Uuid,
        code: &str,
        title: &str,
    ) -> AppResult<Option<Subject>> {
        let result = SubjectEntity::find()
            .filter(subject::Column::CourseId.eq(course_id))
            .filter(subject::Column::Code.eq(code))
            .filter(subject::Column::Title.eq(title))
            .one(self.db.as_ref())
            .await?;
        Ok(result.map(Subject::from))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Subject>, u64)> {
        let mut query = SubjectEntity::find().order_by_asc(subject::Column::Code);

        if let Some(term) = params.search_term() {
            query = query.filter(
                Condition::any()
                    .add(subject::Column::Code.contains(term))
                    .add(subject::Column::Title.contains(term)),
            );
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Subject::from).collect(), total))
    }

    async fn create(&self, data: CreateSubject) -> AppResult<Subject> {
        let now = chrono::Utc::now();
        let active_model = subject::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(data.code),
            title: Set(data.title),
            units: Set(data.units),
            course_id: Set(data.course_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(Subject::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateSubject) -> AppResult<Subject> {
        let existing = SubjectEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: subject::ActiveModel = existing.into();

        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(units) = changes.units {
            active.units = Set(units);
        }
        if let Some(course_id) = changes.course_id {
            active.course_id = Set(course_id);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(Subject::from(model))
    }

    async fn count_dependents(&self, id: Uuid) -> AppResult<SubjectDependents> {
        count_dependents(self.db.as_ref(), id).await
    }
}

// Shared query functions, usable inside transactions.

pub(crate) async fn count_dependents<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<SubjectDependents> {
    let reservations = ReservationEntity::find()
        .filter(reservation::Column::SubjectId.eq(id))
        .count(conn)
        .await?;
    let grades = GradeEntity::find()
        .filter(grade::Column::SubjectId.eq(id))
        .count(conn)
        .await?;

    Ok(SubjectDependents {
        reservations,
        grades,
    })
}

/// Delete a subject and its reservations/grades. Must run inside a transaction.
pub(crate) async fn cascade_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    GradeEntity::delete_many()
        .filter(grade::Column::SubjectId.eq(id))
        .exec(conn)
        .await?;
    ReservationEntity::delete_many()
        .filter(reservation::Column::SubjectId.eq(id))
        .exec(conn)
        .await?;

    let result = SubjectEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Plain delete for a subject with no dependents.
pub(crate) async fn delete_plain<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let result = SubjectEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
