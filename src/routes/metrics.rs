//! Derived metrics route.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminSession;
use crate::services::metrics::{self as metrics_service, MetricsPayload, MetricsQuery};
use crate::AppState;

/// GET /api/v1/metrics?type=...
pub async fn compute(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<MetricsPayload>>, AppError> {
    let kind = query.kind()?;
    let payload = metrics_service::compute(state.store(), kind).await?;
    Ok(ApiResponse::success(payload))
}
