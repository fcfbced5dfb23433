//! Reservation service - subject slots held by students.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CreateReservation, ReservationStatus, SubjectReservation};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Reservation service trait for dependency injection.
#[async_trait]
pub trait ReservationService: Send + Sync {
    async fn get_reservation(&self, id: Uuid) -> AppResult<SubjectReservation>;

    async fn list_reservations(
        &self,
        params: &PaginationParams,
    ) -> AppResult<Paginated<SubjectReservation>>;

    /// Reserve a subject for a student; one active reservation per pair
    async fn create_reservation(&self, data: CreateReservation) -> AppResult<SubjectReservation>;

    async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<SubjectReservation>;

    async fn delete_reservation(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ReservationService using Unit of Work.
pub struct ReservationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReservationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReservationService for ReservationManager<U> {
    async fn get_reservation(&self, id: Uuid) -> AppResult<SubjectReservation> {
        self.uow
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_reservations(
        &self,
        params: &PaginationParams,
    ) -> AppResult<Paginated<SubjectReservation>> {
        let (items, total) = self.uow.reservations().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn create_reservation(&self, data: CreateReservation) -> AppResult<SubjectReservation> {
        self.uow
            .students()
            .find_by_id(data.student_id)
            .await?
            .ok_or_else(|| AppError::validation("Student does not exist"))?;

        self.uow
            .subjects()
            .find_by_id(data.subject_id)
            .await?
            .ok_or_else(|| AppError::validation("Subject does not exist"))?;

        if self
            .uow
            .reservations()
            .find_by_student_and_subject(data.student_id, data.subject_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Reservation"));
        }

        self.uow.reservations().create(data).await
    }

    async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<SubjectReservation> {
        self.get_reservation(id).await?;
        self.uow.reservations().update_status(id, status).await
    }

    async fn delete_reservation(&self, id: Uuid) -> AppResult<()> {
        self.get_reservation(id).await?;
        self.uow.reservations().delete(id).await
    }
}
