//! Authentication routes: login, logout, current session.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminSession;
use crate::services::auth::{self as auth_service, SessionToken};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub subject: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionToken>>, AppError> {
    let session = auth_service::login(&state.config, &body.password)?;
    Ok(ApiResponse::success(session))
}

/// POST /api/v1/auth/logout — the client discards its token.
pub async fn logout() -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("Logged out successfully")
}

/// GET /api/v1/auth/session
pub async fn session(session: AdminSession) -> Json<ApiResponse<SessionInfo>> {
    ApiResponse::success(SessionInfo {
        subject: session.subject,
        expires_at: session.expires_at,
    })
}
