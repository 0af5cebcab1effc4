use std::env;
use std::time::Duration;

use crate::db::retry::RetryPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Argon2 PHC string of the shared admin secret. There is no default.
    pub admin_password_hash: String,
    pub admin_session_expiry_secs: i64,
    pub query_timeout_secs: u64,
    pub query_max_attempts: u32,
    pub query_retry_base_ms: u64,
    pub request_timeout_secs: u64,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("BACKEND_PORT", 3000),
            jwt_secret: env::var("JWT_SECRET")?,
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH")?,
            admin_session_expiry_secs: parse_or("ADMIN_SESSION_EXPIRY_SECS", 900),
            query_timeout_secs: parse_or("QUERY_TIMEOUT_SECS", 10),
            query_max_attempts: parse_or("QUERY_MAX_ATTEMPTS", 3),
            query_retry_base_ms: parse_or("QUERY_RETRY_BASE_MS", 200),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }

    /// Retry policy applied to every store query.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.query_max_attempts.max(1),
            base_delay: Duration::from_millis(self.query_retry_base_ms),
            attempt_timeout: Duration::from_secs(self.query_timeout_secs.max(1)),
        }
    }
}

/// Read an optional numeric variable, falling back to `default` when unset or unparseable.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
