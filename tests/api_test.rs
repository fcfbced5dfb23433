//! Integration tests for API endpoints.
//!
//! These tests drive the real router with mock services, so routing,
//! extractors, the session cookie, and the role gates are exercised
//! without a database connection.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use tower::ServiceExt;
use uuid::Uuid;

use sis_server::api::{create_router, AppState, CookieSettings};
use sis_server::domain::{
    AuditEntry, Course, CreateCourse, CreateGrade, CreateReservation, CreateStudent, CreateSubject,
    CreateUser, Grade, Invitation, NewAuditEntry, ReservationStatus, Student, Subject,
    SubjectReservation, UpdateCourse, UpdateGrade, UpdateStudent, UpdateSubject, UpdateUser, User,
    UserRole,
};
use sis_server::errors::{AppError, AppResult};
use sis_server::infra::Database;
use sis_server::services::{
    AuditService, AuthService, Claims, CompleteInvite, CourseService, GradeService, InviteService,
    ReservationService, ServiceContainer, StudentService, SubjectService, UserService,
};
use sis_server::types::{BulkDeleteResponse, Paginated, PaginationParams};

// =============================================================================
// Mock Services
// =============================================================================

const ADMIN_EMAIL: &str = "registrar@school.test";
const GOOD_PASSWORD: &str = "correct-horse";

fn admin_user(id: Uuid) -> User {
    User {
        id,
        email: ADMIN_EMAIL.to_string(),
        password_hash: "hashed".to_string(),
        first_name: "Reggie".to_string(),
        last_name: "Strar".to_string(),
        role: UserRole::Admin,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_student(id: Uuid) -> Student {
    Student {
        id,
        student_no: "2026-00001".to_string(),
        first_name: "Jose".to_string(),
        middle_name: None,
        last_name: "Rizal".to_string(),
        email: None,
        birth_date: None,
        course_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Auth service with canned credentials and tokens. The token strings
/// double as the role the session carries.
struct CannedAuth;

#[async_trait]
impl AuthService for CannedAuth {
    async fn login(&self, email: String, password: String) -> AppResult<(User, String)> {
        if email == ADMIN_EMAIL && password == GOOD_PASSWORD {
            Ok((admin_user(Uuid::new_v4()), "admin-token".to_string()))
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let role = match token {
            "admin-token" => "admin",
            "encoder-token" => "encoder",
            "student-token" => "student",
            _ => return Err(AppError::Unauthorized),
        };

        Ok(Claims {
            sub: Uuid::new_v4(),
            email: format!("{}@school.test", role),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }

    async fn change_password(
        &self,
        _user_id: Uuid,
        _current_password: String,
        _new_password: String,
    ) -> AppResult<()> {
        Ok(())
    }
}

struct CannedUsers;

#[async_trait]
impl UserService for CannedUsers {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        Ok(admin_user(id))
    }

    async fn list_users(&self, params: &PaginationParams) -> AppResult<Paginated<User>> {
        Ok(Paginated::new(vec![admin_user(Uuid::new_v4())], params, 1))
    }

    async fn create_user(&self, _data: CreateUser) -> AppResult<User> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn update_user(&self, _id: Uuid, _changes: UpdateUser) -> AppResult<User> {
        Err(AppError::internal("not wired in this test"))
    }
}

/// Students service where every targeted delete is blocked by dependents.
struct CannedStudents;

#[async_trait]
impl StudentService for CannedStudents {
    async fn get_student(&self, _id: Uuid) -> AppResult<Student> {
        Err(AppError::NotFound)
    }

    async fn list_students(&self, params: &PaginationParams) -> AppResult<Paginated<Student>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn create_student(&self, _data: CreateStudent) -> AppResult<Student> {
        Ok(sample_student(Uuid::new_v4()))
    }

    async fn update_student(&self, _id: Uuid, _changes: UpdateStudent) -> AppResult<Student> {
        Err(AppError::NotFound)
    }

    async fn delete_student(&self, _id: Uuid, _force: bool) -> AppResult<()> {
        Err(AppError::has_dependents("Student"))
    }

    async fn bulk_delete_students(
        &self,
        _ids: Vec<Uuid>,
        _force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        Ok(BulkDeleteResponse {
            deleted: 1,
            skipped: 1,
        })
    }
}

struct SilentAudit;

#[async_trait]
impl AuditService for SilentAudit {
    async fn record(&self, _entry: NewAuditEntry) {}

    async fn list_entries(&self, params: &PaginationParams) -> AppResult<Paginated<AuditEntry>> {
        Ok(Paginated::new(vec![], params, 0))
    }
}

const PENDING_INVITE_TOKEN: &str = "tok-pending";
const PENDING_INVITE_EMAIL: &str = "new.encoder@school.test";

/// Invite service with one pending token, for the public endpoints.
struct CannedInvites;

#[async_trait]
impl InviteService for CannedInvites {
    async fn create_invite(
        &self,
        _email: String,
        _role: UserRole,
        _invited_by: Uuid,
    ) -> AppResult<Invitation> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn verify_invite(&self, token: &str) -> AppResult<Invitation> {
        if token != PENDING_INVITE_TOKEN {
            return Err(AppError::InvalidToken);
        }
        Ok(Invitation {
            id: Uuid::new_v4(),
            token: PENDING_INVITE_TOKEN.to_string(),
            email: PENDING_INVITE_EMAIL.to_string(),
            role: UserRole::Encoder,
            invited_by: None,
            expires_at: Utc::now() + chrono::Duration::hours(24),
            created_at: Utc::now(),
        })
    }

    async fn complete_invite(&self, data: CompleteInvite) -> AppResult<User> {
        if data.token != PENDING_INVITE_TOKEN {
            return Err(AppError::InvalidToken);
        }
        Ok(admin_user(Uuid::new_v4()))
    }

    async fn list_invites(&self, params: &PaginationParams) -> AppResult<Paginated<Invitation>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn revoke_invite(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

struct NotWiredCourses;

#[async_trait]
impl CourseService for NotWiredCourses {
    async fn get_course(&self, _id: Uuid) -> AppResult<Course> {
        Err(AppError::NotFound)
    }

    async fn list_courses(&self, params: &PaginationParams) -> AppResult<Paginated<Course>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn create_course(&self, _data: CreateCourse) -> AppResult<Course> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn update_course(&self, _id: Uuid, _changes: UpdateCourse) -> AppResult<Course> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_course(&self, _id: Uuid, _force: bool) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn bulk_delete_courses(
        &self,
        _ids: Vec<Uuid>,
        _force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        Err(AppError::internal("not wired in this test"))
    }
}

struct NotWiredSubjects;

#[async_trait]
impl SubjectService for NotWiredSubjects {
    async fn get_subject(&self, _id: Uuid) -> AppResult<Subject> {
        Err(AppError::NotFound)
    }

    async fn list_subjects(&self, params: &PaginationParams) -> AppResult<Paginated<Subject>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn create_subject(&self, _data: CreateSubject) -> AppResult<Subject> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn update_subject(&self, _id: Uuid, _changes: UpdateSubject) -> AppResult<Subject> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_subject(&self, _id: Uuid, _force: bool) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn bulk_delete_subjects(
        &self,
        _ids: Vec<Uuid>,
        _force: bool,
    ) -> AppResult<BulkDeleteResponse> {
        Err(AppError::internal("not wired in this test"))
    }
}

struct NotWiredGrades;

#[async_trait]
impl GradeService for NotWiredGrades {
    async fn get_grade(&self, _id: Uuid) -> AppResult<Grade> {
        Err(AppError::NotFound)
    }

    async fn list_grades(&self, params: &PaginationParams) -> AppResult<Paginated<Grade>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn list_grades_for_student(&self, _student_id: Uuid) -> AppResult<Vec<Grade>> {
        Ok(vec![])
    }

    async fn create_grade(&self, _data: CreateGrade) -> AppResult<Grade> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn update_grade(&self, _id: Uuid, _changes: UpdateGrade) -> AppResult<Grade> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_grade(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

struct NotWiredReservations;

#[async_trait]
impl ReservationService for NotWiredReservations {
    async fn get_reservation(&self, _id: Uuid) -> AppResult<SubjectReservation> {
        Err(AppError::NotFound)
    }

    async fn list_reservations(
        &self,
        params: &PaginationParams,
    ) -> AppResult<Paginated<SubjectReservation>> {
        Ok(Paginated::new(vec![], params, 0))
    }

    async fn create_reservation(&self, _data: CreateReservation) -> AppResult<SubjectReservation> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn update_reservation_status(
        &self,
        _id: Uuid,
        _status: ReservationStatus,
    ) -> AppResult<SubjectReservation> {
        Err(AppError::NotFound)
    }

    async fn delete_reservation(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

struct TestServices;

impl ServiceContainer for TestServices {
    fn auth(&self) -> Arc<dyn AuthService> {
        Arc::new(CannedAuth)
    }

    fn invites(&self) -> Arc<dyn InviteService> {
        Arc::new(CannedInvites)
    }

    fn users(&self) -> Arc<dyn UserService> {
        Arc::new(CannedUsers)
    }

    fn students(&self) -> Arc<dyn StudentService> {
        Arc::new(CannedStudents)
    }

    fn courses(&self) -> Arc<dyn CourseService> {
        Arc::new(NotWiredCourses)
    }

    fn subjects(&self) -> Arc<dyn SubjectService> {
        Arc::new(NotWiredSubjects)
    }

    fn grades(&self) -> Arc<dyn GradeService> {
        Arc::new(NotWiredGrades)
    }

    fn reservations(&self) -> Arc<dyn ReservationService> {
        Arc::new(NotWiredReservations)
    }

    fn audit(&self) -> Arc<dyn AuditService> {
        Arc::new(SilentAudit)
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_app() -> axum::Router {
    // The health endpoint runs `SELECT 1` against the connection; give the
    // mock an exec result to serve it.
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let state = AppState::new(
        Arc::new(TestServices),
        Arc::new(Database::from_connection(connection)),
        CookieSettings {
            secure: false,
            ttl_days: 7,
        },
    );

    create_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn get_with_session(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("sis_session={}", token))
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("sis_session={}", token));
    }

    builder.body(Body::from(body.to_string())).expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn login_sets_the_session_cookie() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            &format!(
                r#"{{"email":"{}","password":"{}"}}"#,
                ADMIN_EMAIL, GOOD_PASSWORD
            ),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie string")
        .to_string();
    assert!(cookie.contains("sis_session=admin-token"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn login_failure_is_unauthorized_with_error_body() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"registrar@school.test","password":"wrong"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_rejects_malformed_email() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"not-an-email","password":"whatever"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_without_a_session_is_null() {
    let app = test_app();

    let response = app.oneshot(get("/auth/me")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::Value::Null);
}

#[tokio::test]
async fn me_with_a_session_returns_the_account() {
    let app = test_app();

    let response = app
        .oneshot(get_with_session("/auth/me", "admin-token"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = test_app();

    let response = app
        .oneshot(json_request("POST", "/auth/logout", None, ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie string");
    assert!(cookie.starts_with("sis_session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn invite_verification_is_public_and_reports_the_email() {
    let app = test_app();

    let response = app
        .oneshot(get(&format!("/auth/verify-invite/{}", PENDING_INVITE_TOKEN)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["email"], PENDING_INVITE_EMAIL);
}

#[tokio::test]
async fn unknown_invite_token_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(get("/auth/verify-invite/tok-unknown"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invite_completion_needs_only_token_and_password() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/complete-invite",
            None,
            &format!(
                r#"{{"token":"{}","password":"first-day-pass1"}}"#,
                PENDING_INVITE_TOKEN
            ),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Account created");
}

// =============================================================================
// Role Gates
// =============================================================================

#[tokio::test]
async fn resource_routes_require_a_session() {
    let app = test_app();

    let response = app.oneshot(get("/students")).await.expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_sessions_cannot_reach_the_console() {
    let app = test_app();

    let response = app
        .oneshot(get_with_session("/students", "student-token"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn encoder_sessions_can_list_students() {
    let app = test_app();

    let response = app
        .oneshot(get_with_session("/students", "encoder-token"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().expect("items array").is_empty());
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = test_app();

    let denied = app
        .clone()
        .oneshot(get_with_session("/users", "encoder-token"))
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .oneshot(get_with_session("/users", "admin-token"))
        .await
        .expect("response");
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn audit_log_is_admin_only() {
    let app = test_app();

    let denied = app
        .clone()
        .oneshot(get_with_session("/audit", "encoder-token"))
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .oneshot(get_with_session("/audit", "admin-token"))
        .await
        .expect("response");
    assert_eq!(allowed.status(), StatusCode::OK);
}

// =============================================================================
// Students
// =============================================================================

#[tokio::test]
async fn create_student_returns_created() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/students",
            Some("encoder-token"),
            r#"{"firstName":"Jose","lastName":"Rizal"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["studentNo"], "2026-00001");
}

#[tokio::test]
async fn delete_blocked_by_dependents_is_a_conflict() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/students/{}", Uuid::new_v4()),
            Some("admin-token"),
            "",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("dependent"));
}

#[tokio::test]
async fn bulk_delete_reports_per_row_outcome() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/students/bulk-delete",
            Some("admin-token"),
            &format!(r#"{{"ids":["{}","{}"]}}"#, Uuid::new_v4(), Uuid::new_v4()),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["deleted"], 1);
    assert_eq!(body["skipped"], 1);
}

// =============================================================================
// Infrastructure Endpoints
// =============================================================================

#[tokio::test]
async fn health_reports_database_status() {
    let app = test_app();

    let response = app.oneshot(get("/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn root_names_the_service() {
    let app = test_app();

    let response = app.oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert_eq!(&bytes[..], b"SIS admin API");
}
