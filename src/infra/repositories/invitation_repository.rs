//! Invitation repository.
//!
//! Rows here are transient by design: consumption and revocation both
//! delete. Delete helpers return the affected row count so callers can
//! detect a lost race on a token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::invitation::{self, Entity as InvitationEntity};
use crate::domain::{Invitation, UserRole};
use crate::errors::AppResult;
use crate::types::PaginationParams;

/// Fields required to insert an invitation row.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub token: String,
    pub email: String,
    pub role: UserRole,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

/// Invitation repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invitation>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Invitation>, u64)>;

    async fn create(&self, new_invitation: NewInvitation) -> AppResult<Invitation>;

    /// Delete by id, returning the number of rows removed
    async fn delete_by_id(&self, id: Uuid) -> AppResult<u64>;

    /// Drop any pending invitations for an email (re-invite replaces)
    async fn delete_by_email(&self, email: &str) -> AppResult<u64>;
}

/// SeaORM-backed implementation of InvitationRepository.
pub struct InvitationStore {
    db: Arc<DatabaseConnection>,
}

impl InvitationStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationRepository for InvitationStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        find_by_token(self.db.as_ref(), token).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invitation>> {
        let result = InvitationEntity::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(result.map(Invitation::from))
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<Invitation>, u64)> {
        let mut query = InvitationEntity::find().order_by_desc(invitation::Column::CreatedAt);

        if let Some(term) = params.search_term() {
            query = query.filter(invitation::Column::Email.contains(term));
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Invitation::from).collect(), total))
    }

    async fn create(&self, new_invitation: NewInvitation) -> AppResult<Invitation> {
        create(self.db.as_ref(), new_invitation).await
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<u64> {
        delete_by_id(self.db.as_ref(), id).await
    }

    async fn delete_by_email(&self, email: &str) -> AppResult<u64> {
        delete_by_email(self.db.as_ref(), email).await
    }
}

// Shared query functions, usable inside transactions.

pub(crate) async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
) -> AppResult<Option<Invitation>> {
    let result = InvitationEntity::find()
        .filter(invitation::Column::Token.eq(token))
        .one(conn)
        .await?;
    Ok(result.map(Invitation::from))
}

pub(crate) async fn create<C: ConnectionTrait>(
    conn: &C,
    new_invitation: NewInvitation,
) -> AppResult<Invitation> {
    let active_model = invitation::ActiveModel {
        id: Set(Uuid::new_v4()),
        token: Set(new_invitation.token),
        email: Set(new_invitation.email),
        role: Set(new_invitation.role.as_str().to_string()),
        invited_by: Set(new_invitation.invited_by),
        expires_at: Set(new_invitation.expires_at),
        created_at: Set(chrono::Utc::now()),
    };

    let model = active_model.insert(conn).await?;
    Ok(Invitation::from(model))
}

pub(crate) async fn delete_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<u64> {
    let result = InvitationEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}

pub(crate) async fn delete_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<u64> {
    let result = InvitationEntity::delete_many()
        .filter(invitation::Column::Email.eq(email))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
