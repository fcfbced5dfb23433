//! Core business entities and logic.
//!
//! Domain types are persistence-agnostic; the infra layer converts them
//! to and from sea-orm models.

mod audit;
mod course;
mod grade;
mod invitation;
mod password;
mod reservation;
mod student;
mod subject;
mod user;

pub use audit::{AuditEntry, NewAuditEntry};
pub use course::{Course, CourseDependents, CreateCourse, UpdateCourse};
pub use grade::{
    compute_final_grade, derive as derive_grade, CreateGrade, Grade, GradeComponents, Remarks,
    UpdateGrade,
};
pub use invitation::{generate_token as generate_invite_token, Invitation, InvitationResponse};
pub use password::{Password, VerifyOutcome};
pub use reservation::{
    CreateReservation, ReservationStatus, SubjectReservation, UpdateReservation,
};
pub use student::{
    format_student_no, next_student_sequence, CreateStudent, Student, UpdateStudent,
};
pub use subject::{CreateSubject, Subject, SubjectDependents, UpdateSubject};
pub use user::{CreateUser, UpdateUser, User, UserResponse, UserRole};
