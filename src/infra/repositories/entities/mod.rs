//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod audit_log;
pub mod course;
pub mod grade;
pub mod invitation;
pub mod reservation;
pub mod student;
pub mod subject;
pub mod user;
