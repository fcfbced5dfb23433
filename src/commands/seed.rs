//! Seed command - bootstraps the initial admin account.

use crate::cli::args::SeedArgs;
use crate::config::Config;
use crate::domain::{Password, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, NewUser, Persistence, UnitOfWork};

/// Execute the seed command.
///
/// Idempotent: if an account with the email already exists, nothing
/// changes and the command reports it.
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    db.run_migrations()
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let uow = Persistence::new(db.get_connection());

    if uow.users().find_by_email(&args.email).await?.is_some() {
        tracing::info!("Account {} already exists, nothing to do", args.email);
        return Ok(());
    }

    let password_hash = Password::new(&args.password)?.into_string();

    let user = uow
        .users()
        .create(NewUser {
            email: args.email,
            password_hash,
            first_name: args.first_name,
            last_name: args.last_name,
            role: UserRole::Admin,
            is_active: true,
        })
        .await?;

    tracing::info!("Admin account {} created (id {})", user.email, user.id);

    Ok(())
}
