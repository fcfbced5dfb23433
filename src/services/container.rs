//! Service container - centralized service access.
//!
//! Handlers depend on the `ServiceContainer` trait rather than concrete
//! services, so tests can swap in mock implementations.

use std::sync::Arc;

use super::{
    AuditService, AuthService, CourseService, GradeService, InviteService, ReservationService,
    StudentService, SubjectService, UserService,
};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn invites(&self) -> Arc<dyn InviteService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn students(&self) -> Arc<dyn StudentService>;

    fn courses(&self) -> Arc<dyn CourseService>;

    fn subjects(&self) -> Arc<dyn SubjectService>;

    fn grades(&self) -> Arc<dyn GradeService>;

    fn reservations(&self) -> Arc<dyn ReservationService>;

    fn audit(&self) -> Arc<dyn AuditService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    invite_service: Arc<dyn InviteService>,
    user_service: Arc<dyn UserService>,
    student_service: Arc<dyn StudentService>,
    course_service: Arc<dyn CourseService>,
    subject_service: Arc<dyn SubjectService>,
    grade_service: Arc<dyn GradeService>,
    reservation_service: Arc<dyn ReservationService>,
    audit_service: Arc<dyn AuditService>,
}

impl Services {
    /// Create a service container from a database connection and config
    pub fn from_connection(db: Arc<sea_orm::DatabaseConnection>, config: Config) -> Self {
        use super::{
            AuditTrail, Authenticator, CourseManager, GradeManager, InviteManager,
            ReservationManager, StudentManager, SubjectManager, UserManager,
        };

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            invite_service: Arc::new(InviteManager::new(uow.clone(), config.clone())),
            user_service: Arc::new(UserManager::new(uow.clone())),
            student_service: Arc::new(StudentManager::new(uow.clone())),
            course_service: Arc::new(CourseManager::new(uow.clone())),
            subject_service: Arc::new(SubjectManager::new(uow.clone())),
            grade_service: Arc::new(GradeManager::new(uow.clone(), config)),
            reservation_service: Arc::new(ReservationManager::new(uow.clone())),
            audit_service: Arc::new(AuditTrail::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn invites(&self) -> Arc<dyn InviteService> {
        self.invite_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn students(&self) -> Arc<dyn StudentService> {
        self.student_service.clone()
    }

    fn courses(&self) -> Arc<dyn CourseService> {
        self.course_service.clone()
    }

    fn subjects(&self) -> Arc<dyn SubjectService> {
        self.subject_service.clone()
    }

    fn grades(&self) -> Arc<dyn GradeService> {
        self.grade_service.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationService> {
        self.reservation_service.clone()
    }

    fn audit(&self) -> Arc<dyn AuditService> {
        self.audit_service.clone()
    }
}
