pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use sqlx::PgPool;

use services::store::Store;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
}

impl AppState {
    /// Store handle using the configured retry policy.
    pub fn store(&self) -> Store<'_> {
        Store::new(&self.db, self.config.retry_policy())
    }
}
