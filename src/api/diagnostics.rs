use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, ApiResponse, AppState, Data, JsonBody};
use crate::services::account_service::UserProfile;

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: Value,
}

/// GET /api/test/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Data<Vec<UserProfile>>>>, ApiError> {
    let users = state.account_service().list_profiles().await?;
    Ok(Json(ApiResponse::success(Data { data: users })))
}

/// POST /api/test/ echoes the request body.
pub async fn echo(JsonBody(payload): JsonBody<Value>) -> Json<EchoResponse> {
    debug!(payload = %payload, "Echo request received");
    Json(EchoResponse {
        status: "ok",
        message: "POST request received",
        data: payload,
    })
}
