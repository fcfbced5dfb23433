//! User service - console account administration.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CreateUser, Password, UpdateUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewUser, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn list_users(&self, params: &PaginationParams) -> AppResult<Paginated<User>>;

    /// Create an account directly, bypassing the invitation flow
    async fn create_user(&self, data: CreateUser) -> AppResult<User>;

    /// Update profile, role, or active flag
    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_users(&self, params: &PaginationParams) -> AppResult<Paginated<User>> {
        let (items, total) = self.uow.users().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        if self.uow.users().find_by_email(&data.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = Password::new(&data.password)?.into_string();

        self.uow
            .users()
            .create(NewUser {
                email: data.email,
                password_hash,
                first_name: data.first_name,
                last_name: data.last_name,
                role: data.role,
                is_active: true,
            })
            .await
    }

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        self.uow.users().update(id, changes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::UserRole;
    use crate::infra::repositories::MockUserRepository;
    use crate::services::testing::StubUow;

    #[tokio::test]
    async fn create_user_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|email| {
            Ok(Some(User {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                role: UserRole::Encoder,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let svc = UserManager::new(Arc::new(StubUow {
            users: Arc::new(users),
            ..StubUow::default()
        }));

        let result = svc
            .create_user(CreateUser {
                email: "taken@school.test".to_string(),
                password: "password1".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                role: UserRole::Encoder,
            })
            .await;

        assert!(matches!(result, Err(AppError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn create_user_stores_a_hash_not_the_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|new| new.password_hash.starts_with("$argon2") && new.is_active)
            .returning(|new| {
                Ok(User {
                    id: Uuid::new_v4(),
                    email: new.email,
                    password_hash: new.password_hash,
                    first_name: new.first_name,
                    last_name: new.last_name,
                    role: new.role,
                    is_active: new.is_active,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let svc = UserManager::new(Arc::new(StubUow {
            users: Arc::new(users),
            ..StubUow::default()
        }));

        let created = svc
            .create_user(CreateUser {
                email: "enc@school.test".to_string(),
                password: "password1".to_string(),
                first_name: "Enco".to_string(),
                last_name: "Der".to_string(),
                role: UserRole::Encoder,
            })
            .await
            .unwrap();

        assert_ne!(created.password_hash, "password1");
    }
}
