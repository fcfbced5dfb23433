//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod audit_repository;
pub(crate) mod course_repository;
pub(crate) mod entities;
mod grade_repository;
pub(crate) mod invitation_repository;
mod reservation_repository;
pub(crate) mod student_repository;
pub(crate) mod subject_repository;
pub(crate) mod user_repository;

pub use audit_repository::{AuditRepository, AuditStore};
pub use course_repository::{CourseRepository, CourseStore};
pub use grade_repository::{GradeRecord, GradeRepository, GradeStore};
pub use invitation_repository::{InvitationRepository, InvitationStore, NewInvitation};
pub use reservation_repository::{ReservationRepository, ReservationStore};
pub use student_repository::{StudentRepository, StudentStore};
pub use subject_repository::{SubjectRepository, SubjectStore};
pub use user_repository::{NewUser, UserRepository, UserStore};

// Transaction-scoped query functions, re-exported for the unit of work
pub(crate) use course_repository as course_queries;
pub(crate) use invitation_repository as invitation_queries;
pub(crate) use student_repository as student_queries;
pub(crate) use subject_repository as subject_queries;
pub(crate) use user_repository as user_queries;

// Export mocks for unit tests
#[cfg(test)]
pub use audit_repository::MockAuditRepository;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use grade_repository::MockGradeRepository;
#[cfg(test)]
pub use invitation_repository::MockInvitationRepository;
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
#[cfg(test)]
pub use student_repository::MockStudentRepository;
#[cfg(test)]
pub use subject_repository::MockSubjectRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
