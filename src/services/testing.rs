//! Shared service-test support: a unit of work backed by mockall repos.
//!
//! Transactions are not supported here; transactional flows are covered
//! by repository and router tests instead.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{
    MockAuditRepository, MockCourseRepository, MockGradeRepository, MockInvitationRepository,
    MockReservationRepository, MockStudentRepository, MockSubjectRepository, MockUserRepository,
};
use crate::infra::{
    AuditRepository, CourseRepository, GradeRepository, InvitationRepository,
    ReservationRepository, StudentRepository, SubjectRepository, TransactionContext, UnitOfWork,
    UserRepository,
};

pub(crate) struct StubUow {
    pub users: Arc<MockUserRepository>,
    pub invitations: Arc<MockInvitationRepository>,
    pub students: Arc<MockStudentRepository>,
    pub courses: Arc<MockCourseRepository>,
    pub subjects: Arc<MockSubjectRepository>,
    pub reservations: Arc<MockReservationRepository>,
    pub grades: Arc<MockGradeRepository>,
    pub audit: Arc<MockAuditRepository>,
}

impl Default for StubUow {
    fn default() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            invitations: Arc::new(MockInvitationRepository::new()),
            students: Arc::new(MockStudentRepository::new()),
            courses: Arc::new(MockCourseRepository::new()),
            subjects: Arc::new(MockSubjectRepository::new()),
            reservations: Arc::new(MockReservationRepository::new()),
            grades: Arc::new(MockGradeRepository::new()),
            audit: Arc::new(MockAuditRepository::new()),
        }
    }
}

#[async_trait]
impl UnitOfWork for StubUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn invitations(&self) -> Arc<dyn InvitationRepository> {
        self.invitations.clone()
    }

    fn students(&self) -> Arc<dyn StudentRepository> {
        self.students.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.courses.clone()
    }

    fn subjects(&self) -> Arc<dyn SubjectRepository> {
        self.subjects.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationRepository> {
        self.reservations.clone()
    }

    fn grades(&self) -> Arc<dyn GradeRepository> {
        self.grades.clone()
    }

    fn audit(&self) -> Arc<dyn AuditRepository> {
        self.audit.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("transactions unavailable in StubUow"))
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("transactions unavailable in StubUow"))
    }
}
