//! User repository - persistence for console accounts.
//!
//! Query functions are generic over the connection so the same code path
//! serves both the pooled connection and an open transaction.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::user::{self, Entity as UserEntity};
use crate::domain::{UpdateUser, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Fields required to insert a user row. The password is already hashed
/// by the time it reaches the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// User repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<User>, u64)>;

    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Replace the stored credential with a freshly hashed one
    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;
}

/// SeaORM-backed implementation of UserRepository.
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_by_id(self.db.as_ref(), id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(self.db.as_ref(), email).await
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let mut query = UserEntity::find().order_by_asc(user::Column::Email);

        if let Some(term) = params.search_term() {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Email.contains(term))
                    .add(user::Column::FirstName.contains(term))
                    .add(user::Column::LastName.contains(term)),
            );
        }

        let paginator = query.paginate(self.db.as_ref(), params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        create(self.db.as_ref(), new_user).await
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let existing = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now());
        active.update(self.db.as_ref()).await?;

        Ok(())
    }
}

// Shared query functions, usable inside transactions.

pub(crate) async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id).one(conn).await?;
    Ok(result.map(User::from))
}

pub(crate) async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(conn)
        .await?;
    Ok(result.map(User::from))
}

pub(crate) async fn create<C: ConnectionTrait>(conn: &C, new_user: NewUser) -> AppResult<User> {
    let now = chrono::Utc::now();
    let active_model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(new_user.email),
        password_hash: Set(new_user.password_hash),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        role: Set(new_user.role.as_str().to_string()),
        is_active: Set(new_user.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(conn).await?;
    Ok(User::from(model))
}
