//! Application services layer - use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod audit_service;
mod auth_service;
pub mod container;
mod course_service;
mod grade_service;
mod invite_service;
mod reservation_service;
mod student_service;
mod subject_service;
#[cfg(test)]
pub(crate) mod testing;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use audit_service::{AuditService, AuditTrail};
pub use auth_service::{AuthService, Authenticator, Claims};
pub use course_service::{CourseManager, CourseService};
pub use grade_service::{GradeManager, GradeService};
pub use invite_service::{CompleteInvite, InviteManager, InviteService};
pub use reservation_service::{ReservationManager, ReservationService};
pub use student_service::{StudentManager, StudentService};
pub use subject_service::{SubjectManager, SubjectService};
pub use user_service::{UserManager, UserService};
