//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Ensures consistency across multiple repository operations
//!
//! Multi-step mutations (invitation completion, forced cascading deletes,
//! student-number generation) go through `transaction`/
//! `transaction_serializable` so partial failure leaves no orphaned or
//! duplicated state.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    course_queries, invitation_queries, student_queries, subject_queries, user_queries,
    AuditRepository, AuditStore, CourseRepository, CourseStore, GradeRepository, GradeStore,
    InvitationRepository, InvitationStore, NewInvitation, NewUser, ReservationRepository,
    ReservationStore, StudentRepository, StudentStore, SubjectRepository, SubjectStore,
    UserRepository, UserStore,
};
use crate::domain::{
    CourseDependents, CreateStudent, Invitation, Student, SubjectDependents, User,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock at the repository level or use integration tests.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn invitations(&self) -> Arc<dyn InvitationRepository>;
    fn students(&self) -> Arc<dyn StudentRepository>;
    fn courses(&self) -> Arc<dyn CourseRepository>;
    fn subjects(&self) -> Arc<dyn SubjectRepository>;
    fn reservations(&self) -> Arc<dyn ReservationRepository>;
    fn grades(&self) -> Arc<dyn GradeRepository>;
    fn audit(&self) -> Arc<dyn AuditRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back
    /// on error. Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable isolation.
    ///
    /// Used where concurrent duplicates must be impossible, e.g. invitation
    /// completion.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All operations performed through this context are part of the same
/// database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn invitations(&self) -> TxInvitationRepository<'_> {
        TxInvitationRepository { txn: self.txn }
    }

    pub fn students(&self) -> TxStudentRepository<'_> {
        TxStudentRepository { txn: self.txn }
    }

    pub fn courses(&self) -> TxCourseRepository<'_> {
        TxCourseRepository { txn: self.txn }
    }

    pub fn subjects(&self) -> TxSubjectRepository<'_> {
        TxSubjectRepository { txn: self.txn }
    }
}

/// Transaction-scoped user operations.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxUserRepository<'_> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        user_queries::find_by_id(self.txn, id).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        user_queries::find_by_email(self.txn, email).await
    }

    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        user_queries::create(self.txn, new_user).await
    }
}

/// Transaction-scoped invitation operations.
pub struct TxInvitationRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxInvitationRepository<'_> {
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        invitation_queries::find_by_token(self.txn, token).await
    }

    pub async fn create(&self, new_invitation: NewInvitation) -> AppResult<Invitation> {
        invitation_queries::create(self.txn, new_invitation).await
    }

    /// Returns the number of rows removed; 0 means another completion won
    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<u64> {
        invitation_queries::delete_by_id(self.txn, id).await
    }

    pub async fn delete_by_email(&self, email: &str) -> AppResult<u64> {
        invitation_queries::delete_by_email(self.txn, email).await
    }
}

/// Transaction-scoped student operations.
pub struct TxStudentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxStudentRepository<'_> {
    pub async fn create_with_number(&self, data: CreateStudent) -> AppResult<Student> {
        student_queries::create_with_number(self.txn, data).await
    }

    pub async fn count_dependents(&self, id: Uuid) -> AppResult<u64> {
        student_queries::count_dependents(self.txn, id).await
    }

    pub async fn cascade_delete(&self, id: Uuid) -> AppResult<()> {
        student_queries::cascade_delete(self.txn, id).await
    }

    pub async fn delete_plain(&self, id: Uuid) -> AppResult<()> {
        student_queries::delete_plain(self.txn, id).await
    }
}

/// Transaction-scoped course operations.
pub struct TxCourseRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxCourseRepository<'_> {
    pub async fn count_dependents(&self, id: Uuid) -> AppResult<CourseDependents> {
        course_queries::count_dependents(self.txn, id).await
    }

    pub async fn cascade_delete(&self, id: Uuid) -> AppResult<()> {
        course_queries::cascade_delete(self.txn, id).await
    }

    pub async fn delete_plain(&self, id: Uuid) -> AppResult<()> {
        course_queries::delete_plain(self.txn, id).await
    }
}

/// Transaction-scoped subject operations.
pub struct TxSubjectRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxSubjectRepository<'_> {
    pub async fn count_dependents(&self, id: Uuid) -> AppResult<SubjectDependents> {
        subject_queries::count_dependents(self.txn, id).await
    }

    pub async fn cascade_delete(&self, id: Uuid) -> AppResult<()> {
        subject_queries::cascade_delete(self.txn, id).await
    }

    pub async fn delete_plain(&self, id: Uuid) -> AppResult<()> {
        subject_queries::delete_plain(self.txn, id).await
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    user_repo: Arc<UserStore>,
    invitation_repo: Arc<InvitationStore>,
    student_repo: Arc<StudentStore>,
    course_repo: Arc<CourseStore>,
    subject_repo: Arc<SubjectStore>,
    reservation_repo: Arc<ReservationStore>,
    grade_repo: Arc<GradeStore>,
    audit_repo: Arc<AuditStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            invitation_repo: Arc::new(InvitationStore::new(db.clone())),
            student_repo: Arc::new(StudentStore::new(db.clone())),
            course_repo: Arc::new(CourseStore::new(db.clone())),
            subject_repo: Arc::new(SubjectStore::new(db.clone())),
            reservation_repo: Arc::new(ReservationStore::new(db.clone())),
            grade_repo: Arc::new(GradeStore::new(db.clone())),
            audit_repo: Arc::new(AuditStore::new(db.clone())),
            db,
        }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn invitations(&self) -> Arc<dyn InvitationRepository> {
        self.invitation_repo.clone()
    }

    fn students(&self) -> Arc<dyn StudentRepository> {
        self.student_repo.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.course_repo.clone()
    }

    fn subjects(&self) -> Arc<dyn SubjectRepository> {
        self.subject_repo.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repo.clone()
    }

    fn grades(&self) -> Arc<dyn GradeRepository> {
        self.grade_repo.clone()
    }

    fn audit(&self) -> Arc<dyn AuditRepository> {
        self.audit_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}
