//! Authentication service - login sessions, tokens, password changes.
//!
//! Password hashing lives in the domain `Password` value object; this
//! service owns the session token format and the login flow.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Password, User, UserRole, VerifyOutcome};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims carried by the session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn role(&self) -> AppResult<UserRole> {
        UserRole::parse(&self.role).map_err(|_| AppError::Unauthorized)
    }
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate credentials and mint a session token.
    ///
    /// Returns the authenticated user alongside the signed token; the
    /// handler is responsible for setting the cookie.
    async fn login(&self, email: String, password: String) -> AppResult<(User, String)>;

    /// Verify a session token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Change the caller's own password after re-checking the current one
    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;
}

/// Sign a session token for a user (shared helper)
pub(crate) fn generate_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::days(config.session_ttl_days);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(token)
}

/// Verify a session token and extract claims (shared helper)
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, email: String, password: String) -> AppResult<(User, String)> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // Deactivation is reported as soon as the account is located,
        // whether or not the submitted password is correct.
        if let Some(user) = &user_result {
            if !user.is_active {
                return Err(AppError::AccountDeactivated);
            }
        }

        // SECURITY: Perform password verification even if the user doesn't
        // exist to prevent timing attacks that could enumerate valid emails.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let stored = match &user_result {
            Some(user) => user.password_hash.as_str(),
            None => dummy_hash,
        };

        let outcome = Password::from_stored(stored.to_string()).verify_detailed(&password);

        let user = match (user_result, &outcome) {
            (Some(user), VerifyOutcome::Valid | VerifyOutcome::ValidLegacyPlaintext) => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        // Rows imported from the legacy system stored passwords in the
        // clear; upgrade them to argon2 on first successful login.
        if matches!(outcome, VerifyOutcome::ValidLegacyPlaintext) {
            tracing::warn!(user_id = %user.id, "rehashing legacy plaintext credential");
            let rehashed = Password::new(&password)?.into_string();
            self.uow.users().update_password(user.id, rehashed).await?;
        }

        let token = generate_token(&user, &self.config)?;
        Ok((user, token))
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let stored = Password::from_stored(user.password_hash.clone());
        if !stored.verify_detailed(&current_password).is_valid() {
            return Err(AppError::IncorrectCurrentPassword);
        }

        let new_hash = Password::new(&new_password)?.into_string();
        self.uow.users().update_password(user.id, new_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockUserRepository;
    use crate::services::testing::StubUow;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "admin@school.test".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Cruz".to_string(),
            role: UserRole::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let config = Config::for_tests();
        let user = sample_user();

        let token = generate_token(&user, &config).unwrap();
        let claims = verify_token_internal(&token, &config).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = Config::for_tests();
        let user = sample_user();

        let mut token = generate_token(&user, &config).unwrap();
        token.push('x');

        assert!(verify_token_internal(&token, &config).is_err());
    }

    #[test]
    fn unknown_role_in_claims_is_unauthorized() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@y.z".to_string(),
            role: "superuser".to_string(),
            exp: 0,
            iat: 0,
        };

        assert!(matches!(claims.role(), Err(AppError::Unauthorized)));
    }

    fn authenticator(users: MockUserRepository) -> Authenticator<StubUow> {
        let uow = StubUow {
            users: std::sync::Arc::new(users),
            ..StubUow::default()
        };
        Authenticator::new(std::sync::Arc::new(uow), Config::for_tests())
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let result = authenticator(users)
            .login("ghost@school.test".to_string(), "whatever1".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_rejects_deactivated_account_with_correct_password() {
        let mut user = sample_user();
        user.password_hash = Password::new("correct-horse").unwrap().into_string();
        user.is_active = false;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(users)
            .login("admin@school.test".to_string(), "correct-horse".to_string())
            .await;

        assert!(matches!(result, Err(AppError::AccountDeactivated)));
    }

    #[tokio::test]
    async fn login_rejects_deactivated_account_with_wrong_password() {
        let mut user = sample_user();
        user.password_hash = Password::new("correct-horse").unwrap().into_string();
        user.is_active = false;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(users)
            .login("admin@school.test".to_string(), "wrong-guess".to_string())
            .await;

        assert!(matches!(result, Err(AppError::AccountDeactivated)));
    }

    #[tokio::test]
    async fn login_rehashes_legacy_plaintext_credential() {
        let mut user = sample_user();
        user.password_hash = "legacy-password".to_string();
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_update_password()
            .withf(move |id, hash| *id == user_id && hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));

        let result = authenticator(users)
            .login("admin@school.test".to_string(), "legacy-password".to_string())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let mut user = sample_user();
        user.password_hash = Password::new("real-password").unwrap().into_string();
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let result = authenticator(users)
            .change_password(user_id, "wrong-guess".to_string(), "new-password".to_string())
            .await;

        assert!(matches!(result, Err(AppError::IncorrectCurrentPassword)));
    }
}
