//! Invitation service - invite-based account provisioning.
//!
//! An admin issues an invitation for an email and role; the recipient
//! redeems the token to set their password and activate the account.
//! Completion runs under serializable isolation so two clients racing on
//! the same token cannot both create an account.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{generate_invite_token, Invitation, Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewInvitation, NewUser, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// Profile details supplied when redeeming an invitation.
#[derive(Debug, Clone)]
pub struct CompleteInvite {
    pub token: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Invitation service trait for dependency injection.
#[async_trait]
pub trait InviteService: Send + Sync {
    /// Issue an invitation, replacing any pending one for the same email.
    ///
    /// Returns the invitation together with the raw token; the token is
    /// shown once to the issuing admin and never listed afterwards.
    async fn create_invite(
        &self,
        email: String,
        role: UserRole,
        invited_by: Uuid,
    ) -> AppResult<Invitation>;

    /// Look up an invitation by token, rejecting expired ones
    async fn verify_invite(&self, token: &str) -> AppResult<Invitation>;

    /// Redeem an invitation: create the account and consume the token
    async fn complete_invite(&self, data: CompleteInvite) -> AppResult<User>;

    async fn list_invites(&self, params: &PaginationParams) -> AppResult<Paginated<Invitation>>;

    /// Revoke a pending invitation
    async fn revoke_invite(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of InviteService using Unit of Work.
pub struct InviteManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> InviteManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> InviteService for InviteManager<U> {
    async fn create_invite(
        &self,
        email: String,
        role: UserRole,
        invited_by: Uuid,
    ) -> AppResult<Invitation> {
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let token = generate_invite_token();
        let expires_at = Utc::now() + Duration::hours(self.config.invite_ttl_hours);

        // Replace-then-insert must be atomic or a crash between the two
        // steps would leave the email with no pending invitation.
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.invitations().delete_by_email(&email).await?;
                    ctx.invitations()
                        .create(NewInvitation {
                            token,
                            email,
                            role,
                            invited_by: Some(invited_by),
                            expires_at,
                        })
                        .await
                })
            })
            .await
    }

    async fn verify_invite(&self, token: &str) -> AppResult<Invitation> {
        let invitation = self
            .uow
            .invitations()
            .find_by_token(token)
            .await?
            .ok_or(AppError::InvalidToken)?;

        invitation.ensure_valid(Utc::now())?;
        Ok(invitation)
    }

    async fn complete_invite(&self, data: CompleteInvite) -> AppResult<User> {
        let password_hash = Password::new(&data.password)?.into_string();

        self.uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    let invitation = ctx
                        .invitations()
                        .find_by_token(&data.token)
                        .await?
                        .ok_or(AppError::InvalidToken)?;

                    invitation.ensure_valid(Utc::now())?;

                    if ctx.users().find_by_email(&invitation.email).await?.is_some() {
                        return Err(AppError::UserAlreadyExists);
                    }

                    // Zero rows deleted means a concurrent completion got
                    // here first; treat the token as already spent.
                    let removed = ctx.invitations().delete_by_id(invitation.id).await?;
                    if removed == 0 {
                        return Err(AppError::InvalidToken);
                    }

                    ctx.users()
                        .create(NewUser {
                            email: invitation.email,
                            password_hash,
                            first_name: data.first_name,
                            last_name: data.last_name,
                            role: invitation.role,
                            is_active: true,
                        })
                        .await
                })
            })
            .await
    }

    async fn list_invites(&self, params: &PaginationParams) -> AppResult<Paginated<Invitation>> {
        let (items, total) = self.uow.invitations().list(params).await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn revoke_invite(&self, id: Uuid) -> AppResult<()> {
        self.uow
            .invitations()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow.invitations().delete_by_id(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::infra::repositories::entities::{invitation, user};
    use crate::infra::repositories::{MockInvitationRepository, MockUserRepository};
    use crate::infra::Persistence;
    use crate::services::testing::StubUow;

    fn pending_invitation(expires_at: chrono::DateTime<Utc>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            token: "tok-123".to_string(),
            email: "new@school.test".to_string(),
            role: UserRole::Encoder,
            invited_by: Some(Uuid::new_v4()),
            expires_at,
            created_at: Utc::now(),
        }
    }

    fn manager(uow: StubUow) -> InviteManager<StubUow> {
        InviteManager::new(Arc::new(uow), crate::config::Config::for_tests())
    }

    #[tokio::test]
    async fn create_invite_rejects_existing_account() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| {
            Ok(Some(crate::domain::User {
                id: Uuid::new_v4(),
                email: "new@school.test".to_string(),
                password_hash: "hash".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                role: UserRole::Encoder,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let svc = manager(StubUow {
            users: Arc::new(users),
            ..StubUow::default()
        });
        let result = svc
            .create_invite(
                "new@school.test".to_string(),
                UserRole::Encoder,
                Uuid::new_v4(),
            )
            .await;

        assert!(matches!(result, Err(AppError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn verify_invite_rejects_unknown_token() {
        let mut invitations = MockInvitationRepository::new();
        invitations.expect_find_by_token().returning(|_| Ok(None));

        let svc = manager(StubUow {
            invitations: Arc::new(invitations),
            ..StubUow::default()
        });

        assert!(matches!(
            svc.verify_invite("nope").await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn verify_invite_rejects_expired_token() {
        let expired = pending_invitation(Utc::now() - Duration::hours(1));
        let mut invitations = MockInvitationRepository::new();
        invitations
            .expect_find_by_token()
            .returning(move |_| Ok(Some(expired.clone())));

        let svc = manager(StubUow {
            invitations: Arc::new(invitations),
            ..StubUow::default()
        });

        assert!(matches!(
            svc.verify_invite("tok-123").await,
            Err(AppError::InvitationExpired)
        ));
    }

    fn invitation_row(token: &str) -> invitation::Model {
        invitation::Model {
            id: Uuid::new_v4(),
            token: token.to_string(),
            email: "new@school.test".to_string(),
            role: "encoder".to_string(),
            invited_by: Some(Uuid::new_v4()),
            expires_at: Utc::now() + Duration::hours(24),
            created_at: Utc::now(),
        }
    }

    fn created_user_row(email: &str) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: "encoder".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn persistence_manager(db: MockDatabase) -> InviteManager<Persistence> {
        let connection = Arc::new(db.into_connection());
        InviteManager::new(
            Arc::new(Persistence::new(connection)),
            crate::config::Config::for_tests(),
        )
    }

    #[tokio::test]
    async fn complete_invite_consumes_the_token_and_creates_the_account() {
        // Inside one serializable transaction: look up the token, confirm
        // the email is free, delete the invitation, insert the user.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invitation_row("tok-123")]])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![created_user_row("new@school.test")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);

        let created = persistence_manager(db)
            .complete_invite(CompleteInvite {
                token: "tok-123".to_string(),
                password: "secret-pass1".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .expect("completion should succeed");

        assert_eq!(created.email, "new@school.test");
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn complete_invite_loser_sees_the_token_as_spent() {
        // The delete removes zero rows when a concurrent completion got
        // there first; the account must not be created.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invitation_row("tok-123")]])
            .append_query_results([Vec::<user::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);

        let result = persistence_manager(db)
            .complete_invite(CompleteInvite {
                token: "tok-123".to_string(),
                password: "secret-pass1".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn revoke_invite_requires_existing_row() {
        let mut invitations = MockInvitationRepository::new();
        invitations.expect_find_by_id().returning(|_| Ok(None));

        let svc = manager(StubUow {
            invitations: Arc::new(invitations),
            ..StubUow::default()
        });

        assert!(matches!(
            svc.revoke_invite(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }
}
