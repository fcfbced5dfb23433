//! Grade repository.
//!
//! The repository persists whatever derived pair the service computed;
//! recomputation policy lives in the domain/service layers.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::grade::{self, Entity as GradeEntity};
use crate::domain::{Grade, GradeComponents, Remarks};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// A grade row ready to persist: components plus the derived pair.
#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub course_id: Uuid,
    pub components: GradeComponents,
    pub final_grade: Option<f64>,
    pub remarks: Option<Remarks>,
}

/// Grade repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Grade>>;

    /// Uniqueness check for `(student_id, subject_id, course_id)`
    async fn find_by_key(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Grade>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Grade>, u64)>;

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Grade>>;

    async fn create(&self, record: GradeRecord) -> AppResult<Grade>;

    /// Rewrite components and the derived pair together
    async fn update(
        &self,
        id: Uuid,
        components: GradeComponents,
        final_grade: Option<f64>,
        remarks: Option<Remarks>,
    ) -> AppResult<Grade>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of GradeRepository.
pub struct GradeStore {
    db: Arc<DatabaseConnection>,
}

impl GradeStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GradeRepository for GradeStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Grade>> {
        let result = GradeEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Grade::from))
    }

    async fn find_by_key(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Grade>> {
        let result = GradeEntity::find()
            .filter(grade::Column::StudentId.eq(student_id))
            .filter(grade::Column::SubjectId.eq(subject_id))
            .filter(grade::Column::CourseId.eq(course_id))
            .one(self.db.as_ref())
            .await?;
        Ok(result.map(Grade::from))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Grade>, u64)> {
        let mut query = GradeEntity::find().order_by_desc(grade::Column::UpdatedAt);

        if let Some(term) = params.search_term() {
            query = query.filter(grade::Column::Remarks.contains(term));
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Grade::from).collect(), total))
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Grade>> {
        let models = GradeEntity::find()
            .filter(grade::Column::StudentId.eq(student_id))
            .order_by_asc(grade::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Grade::from).collect())
    }

    async fn create(&self, record: GradeRecord) -> AppResult<Grade> {
        let now = chrono::Utc::now();
        let active_model = grade::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(record.student_id),
            subject_id: Set(record.subject_id),
            course_id: Set(record.course_id),
            prelim: Set(record.components.prelim),
            midterm: Set(record.components.midterm),
            finals: Set(record.components.finals),
            final_grade: Set(record.final_grade),
            remarks: Set(record.remarks.map(|r| r.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(Grade::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        components: GradeComponents,
        final_grade: Option<f64>,
        remarks: Option<Remarks>,
    ) -> AppResult<Grade> {
        let existing = GradeEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: grade::ActiveModel = existing.into();
        active.prelim = Set(components.prelim);
        active.midterm = Set(components.midterm);
        active.finals = Set(components.finals);
        active.final_grade = Set(final_grade);
        active.remarks = Set(remarks.map(|r| r.as_str().to_string()));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(Grade::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = GradeEntity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
