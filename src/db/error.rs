//! Classification of upstream store failures.

use serde::Serialize;

/// Broad category of a store failure, used to pick the HTTP status and
/// to decide whether a query is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    NotFound,
    Connection,
    Timeout,
    Permission,
    Query,
}

impl StoreErrorKind {
    /// Transient failures may succeed on a later attempt.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Connection | Self::Timeout)
    }
}

/// A failed store operation with its classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(
            StoreErrorKind::Timeout,
            format!("query timed out after {}ms", after.as_millis()),
        )
    }
}

/// SQLSTATE classes that mean the store refused our credentials or grants.
const PERMISSION_CODES: &[&str] = &["42501", "28000", "28P01"];

/// SQLSTATE codes that mean the connection itself is unusable.
const CONNECTION_CODES: &[&str] = &["53300", "57P01", "57P02", "57P03"];

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let kind = match &e {
            sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreErrorKind::Connection,
            sqlx::Error::PoolTimedOut => StoreErrorKind::Timeout,
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) if PERMISSION_CODES.contains(&code.as_ref()) => {
                    StoreErrorKind::Permission
                }
                Some(code)
                    if code.starts_with("08") || CONNECTION_CODES.contains(&code.as_ref()) =>
                {
                    StoreErrorKind::Connection
                }
                _ => StoreErrorKind::Query,
            },
            _ => StoreErrorKind::Query,
        };
        Self::new(kind, e.to_string())
    }
}
