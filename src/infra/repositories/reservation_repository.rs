//! Subject reservation repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::reservation::{self, Entity as ReservationEntity};
use crate::domain::{CreateReservation, ReservationStatus, SubjectReservation};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Reservation repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubjectReservation>>;

    /// Uniqueness check for `(student_id, subject_id)`
    async fn find_by_student_and_subject(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
    ) -> AppResult<Option<SubjectReservation>>;

    async fn list(&self, params: &PaginationParams)
        -> AppResult<(Vec<SubjectReservation>, u64)>;

    async fn create(&self, data: CreateReservation) -> AppResult<SubjectReservation>;

    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<SubjectReservation>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of ReservationRepository.
pub struct ReservationStore {
    db: Arc<DatabaseConnection>,
}

impl ReservationStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubjectReservation>> {
        let result = ReservationEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(SubjectReservation::from))
    }

    async fn find_by_student_and_subject(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
    ) -> AppResult<Option<SubjectReservation>> {
        let result = ReservationEntity::find()
            .filter(reservation::Column::StudentId.eq(student_id))
            .filter(reservation::Column::SubjectId.eq(subject_id))
            .one(self.db.as_ref())
            .await?;
        Ok(result.map(SubjectReservation::from))
    }

    async fn list(
        &self,
        params: &PaginationParams,
    ) -> AppResult<(Vec<SubjectReservation>, u64)> {
        let mut query = ReservationEntity::find().order_by_desc(reservation::Column::CreatedAt);

        if let Some(term) = params.search_term() {
            query = query.filter(reservation::Column::Status.contains(term));
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((
            models.into_iter().map(SubjectReservation::from).collect(),
            total,
        ))
    }

    async fn create(&self, data: CreateReservation) -> AppResult<SubjectReservation> {
        let now = chrono::Utc::now();
        let active_model = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(data.student_id),
            subject_id: Set(data.subject_id),
            status: Set(ReservationStatus::Reserved.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(SubjectReservation::from(model))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<SubjectReservation> {
        let existing = ReservationEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(SubjectReservation::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ReservationEntity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
