//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - SeaORM repositories and entities
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    AuditRepository, AuditStore, CourseRepository, CourseStore, GradeRecord, GradeRepository,
    GradeStore, InvitationRepository, InvitationStore, NewInvitation, NewUser,
    ReservationRepository, ReservationStore, StudentRepository, StudentStore, SubjectRepository,
    SubjectStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(test)]
pub use repositories::{
    MockAuditRepository, MockCourseRepository, MockGradeRepository, MockInvitationRepository,
    MockReservationRepository, MockStudentRepository, MockSubjectRepository, MockUserRepository,
};
