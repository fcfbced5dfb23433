//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    audit_handler, auth_handler, course_handler, grade_handler, invite_handler,
    reservation_handler, student_handler, subject_handler, user_handler, BulkDeleteRequest,
};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{
    AuditEntry, Course, CreateGrade, CreateReservation, Grade, InvitationResponse, Remarks,
    ReservationStatus, Student, Subject, SubjectReservation, UpdateCourse, UpdateGrade,
    UpdateReservation, UpdateStudent, UpdateSubject, UserResponse, UserRole,
};
use crate::types::{BulkDeleteResponse, MessageResponse};

/// OpenAPI documentation for the SIS admin API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SIS Admin API",
        version = "0.1.0",
        description = "School Information System admin console API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        auth_handler::change_password,
        invite_handler::create_invite,
        invite_handler::verify_invite,
        invite_handler::complete_invite,
        invite_handler::list_invites,
        invite_handler::revoke_invite,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::create_user,
        user_handler::update_user,
        student_handler::list_students,
        student_handler::get_student,
        student_handler::create_student,
        student_handler::update_student,
        student_handler::delete_student,
        student_handler::bulk_delete_students,
        course_handler::list_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::delete_course,
        course_handler::bulk_delete_courses,
        subject_handler::list_subjects,
        subject_handler::get_subject,
        subject_handler::create_subject,
        subject_handler::update_subject,
        subject_handler::delete_subject,
        subject_handler::bulk_delete_subjects,
        grade_handler::list_grades,
        grade_handler::get_grade,
        grade_handler::list_grades_for_student,
        grade_handler::create_grade,
        grade_handler::update_grade,
        grade_handler::delete_grade,
        reservation_handler::list_reservations,
        reservation_handler::get_reservation,
        reservation_handler::create_reservation,
        reservation_handler::update_reservation,
        reservation_handler::delete_reservation,
        audit_handler::list_audit_entries,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            Student,
            UpdateStudent,
            Course,
            UpdateCourse,
            Subject,
            UpdateSubject,
            Grade,
            Remarks,
            CreateGrade,
            UpdateGrade,
            SubjectReservation,
            ReservationStatus,
            CreateReservation,
            UpdateReservation,
            InvitationResponse,
            AuditEntry,
            MessageResponse,
            BulkDeleteResponse,
            BulkDeleteRequest,
            auth_handler::LoginRequest,
            auth_handler::LoginResponse,
            auth_handler::ChangePasswordRequest,
            invite_handler::CreateInviteRequest,
            invite_handler::CompleteInviteRequest,
            invite_handler::IssuedInviteResponse,
            invite_handler::VerifyInviteResponse,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            student_handler::CreateStudentRequest,
            course_handler::CreateCourseRequest,
            subject_handler::CreateSubjectRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session management"),
        (name = "Invitations", description = "Invite-based account provisioning"),
        (name = "Users", description = "Console account administration"),
        (name = "Students", description = "Student records"),
        (name = "Courses", description = "Degree programs"),
        (name = "Subjects", description = "Course offerings"),
        (name = "Grades", description = "Component scores and final grades"),
        (name = "Reservations", description = "Subject reservations"),
        (name = "Audit", description = "Mutation audit trail")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
        }
    }
}
