//! Admin session extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::services::auth as auth_service;
use crate::AppState;

/// A validated admin session taken from the `Authorization: Bearer` header.
///
/// Every data, mutation and metrics handler takes one, so an unauthenticated
/// request never reaches the store:
/// ```ignore
/// async fn handler(_session: AdminSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub subject: String,
    pub session_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = auth_service::validate_token(token, &state.config.jwt_secret)?;

        Ok(AdminSession {
            expires_at: claims.expires_at(),
            subject: claims.sub,
            session_id: claims.session_id,
        })
    }
}
