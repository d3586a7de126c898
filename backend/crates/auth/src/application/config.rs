//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;
use kernel::id::UserId;
use platform::config::AppConfig;
use platform::cookie::CookieConfig;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie attributes
    pub cookie: CookieConfig,
    /// Absolute session lifetime
    pub session_ttl: Duration,
    /// The single account allowed past the guard; set after bootstrap
    pub admin_user_id: UserId,
}

impl AuthConfig {
    pub fn new(admin_user_id: UserId) -> Self {
        Self {
            cookie: CookieConfig::default(),
            session_ttl: Duration::hours(24),
            admin_user_id,
        }
    }

    /// Derive from the process configuration
    pub fn from_app(app: &AppConfig, admin_user_id: UserId) -> Self {
        let mut config = Self::new(admin_user_id);
        config.cookie.secure = app.cookie_secure;
        config.cookie.max_age_secs = Some(config.session_ttl.num_seconds());
        config
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }
}
