//! Audit log repository. Append and list only.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::audit_log::{self, Entity as AuditLogEntity};
use crate::domain::{AuditEntry, NewAuditEntry};
use crate::errors::AppResult;
use crate::types::PaginationParams;

/// Audit repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<AuditEntry>, u64)>;
}

/// SeaORM-backed implementation of AuditRepository.
pub struct AuditStore {
    db: Arc<DatabaseConnection>,
}

impl AuditStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for AuditStore {
    async fn record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        let active_model = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            actor_email: Set(entry.actor_email),
            action: Set(entry.action),
            entity: Set(entry.entity),
            entity_id: Set(entry.entity_id),
            details: Set(entry.details),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(AuditEntry::from(model))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<AuditEntry>, u64)> {
        let mut query = AuditLogEntity::find().order_by_desc(audit_log::Column::CreatedAt);

        if let Some(term) = params.search_term() {
            query = query.filter(
                Condition::any()
                    .add(audit_log::Column::ActorEmail.contains(term))
                    .add(audit_log::Column::Action.contains(term))
                    .add(audit_log::Column::Entity.contains(term)),
            );
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(AuditEntry::from).collect(), total))
    }
}
