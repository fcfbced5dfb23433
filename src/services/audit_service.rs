//! Audit service - append-only trail of console mutations.
//!
//! Recording is best-effort from the handlers' point of view: a failed
//! audit insert is logged but never fails the request that triggered it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{AuditEntry, NewAuditEntry};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Audit service trait for dependency injection.
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Record a mutation; errors are swallowed and logged
    async fn record(&self, entry: NewAuditEntry);

    async fn list_entries(&self, params: &PaginationParams) -> AppResult<Paginated<AuditEntry>>;
}

/// Concrete implementation of AuditService using Unit of Work.
pub struct AuditTrail<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AuditTrail<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuditService for AuditTrail<U> {
    async fn record(&self, entry: NewAuditEntry) {
        if let Err(err) = self.uow.audit().record(entry).await {
            tracing::error!("failed to record audit entry: {}", err);
        }
    }

    async fn list_entries(&self, params: &PaginationParams) -> AppResult<Paginated<AuditEntry>> {
        let (items, total) = self.uow.audit().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }
}
