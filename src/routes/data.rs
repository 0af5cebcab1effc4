//! Data access and mutation routes.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminSession;
use crate::services::data::{self as data_service, DataPayload, DataQuery};
use crate::services::mutations::{self, Mutation, MutationResult};
use crate::AppState;

/// GET /api/v1/data?type=... — rows for one admin page.
pub async fn fetch(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<DataQuery>,
) -> Result<Json<ApiResponse<DataPayload>>, AppError> {
    let kind = query.kind()?;
    let payload = data_service::load(state.store(), kind, &query).await?;
    Ok(ApiResponse::success(payload))
}

/// POST /api/v1/data — apply one single-record mutation.
pub async fn mutate(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<MutationResult>>, AppError> {
    let mutation = Mutation::from_body(body)?;
    let result = mutations::apply(state.store(), mutation).await?;
    Ok(ApiResponse::success(result))
}
