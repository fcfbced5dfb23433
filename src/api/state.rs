//! Application state - dependency injection container.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Session cookie parameters, split out of `Config` so router tests can
/// construct state without touching the environment.
#[derive(Clone, Copy, Debug)]
pub struct CookieSettings {
    pub secure: bool,
    pub ttl_days: i64,
}

impl CookieSettings {
    /// Build the session cookie carrying a freshly signed token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(self.ttl_days))
            .build()
    }

    /// Build an expired cookie that clears the session on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub database: Arc<Database>,
    pub cookies: CookieSettings,
}

impl AppState {
    /// Create application state from a connected database and config
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let cookies = CookieSettings {
            secure: config.secure_cookies,
            ttl_days: config.session_ttl_days,
        };
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            services,
            database,
            cookies,
        }
    }

    /// Create application state with manually injected services
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        database: Arc<Database>,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            services,
            database,
            cookies,
        }
    }
}
