//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_INVITE_TTL_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH, SESSION_TTL_DAYS,
};

/// Policy for grade rows with missing components.
///
/// The upstream console never pinned this down, so it is configurable:
/// `zero` computes on whatever is present (missing components count as 0),
/// `strict` refuses to compute until all three components are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingComponentPolicy {
    #[default]
    TreatAsZero,
    Strict,
}

impl MissingComponentPolicy {
    fn from_env_value(value: &str) -> Self {
        match value {
            "strict" => MissingComponentPolicy::Strict,
            _ => MissingComponentPolicy::TreatAsZero,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub session_ttl_days: i64,
    pub invite_ttl_hours: i64,
    pub missing_component_policy: MissingComponentPolicy,
    /// Set the Secure attribute on the session cookie (disable for local dev)
    pub secure_cookies: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("session_ttl_days", &self.session_ttl_days)
            .field("invite_ttl_hours", &self.invite_ttl_hours)
            .field("missing_component_policy", &self.missing_component_policy)
            .field("secure_cookies", &self.secure_cookies)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                // Development mode: use default but warn
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                // Production mode: panic
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        // Validate JWT secret length
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            session_ttl_days: SESSION_TTL_DAYS,
            invite_ttl_hours: env::var("INVITE_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INVITE_TTL_HOURS),
            missing_component_policy: env::var("GRADE_MISSING_POLICY")
                .map(|v| MissingComponentPolicy::from_env_value(&v))
                .unwrap_or_default(),
            secure_cookies: env::var("SECURE_COOKIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(!cfg!(debug_assertions)),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests, no environment access.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/sis_test".to_string(),
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            session_ttl_days: SESSION_TTL_DAYS,
            invite_ttl_hours: DEFAULT_INVITE_TTL_HOURS,
            missing_component_policy: MissingComponentPolicy::TreatAsZero,
            secure_cookies: false,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}
