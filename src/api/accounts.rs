use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{non_blank, require_id, require_password, require_text, validate_id};
use super::{ApiError, ApiResponse, AppState, JsonBody};
use crate::db::ProfileChanges;
use crate::services::account_service::{LoginResult, SignupData, UserProfile};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditUserQuery {
    pub user_id: Option<i32>,
}

/// The fields a user may change. Anything else in the body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EditUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl EditUserRequest {
    fn into_changes(self) -> Result<ProfileChanges, ApiError> {
        Ok(ProfileChanges {
            username: non_blank(self.username, "username")?,
            name: non_blank(self.name, "name")?,
            surname: non_blank(self.surname, "surname")?,
            bio: self.bio,
            location: self.location,
            email: non_blank(self.email, "email")?,
            phone: self.phone,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    pub requester_id: Option<i32>,
    pub target_user_id: Option<i32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/signup/
pub async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignupResponse>>), ApiError> {
    let data = SignupData {
        username: require_text(payload.username, "username")?,
        password: require_password(payload.password)?,
        name: require_text(payload.name, "name")?,
        surname: require_text(payload.surname, "surname")?,
        email: require_text(payload.email, "email")?,
        bio: payload.bio.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
        phone: payload.phone.unwrap_or_default(),
    };

    let user_id = state.account_service().signup(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User created successfully",
            SignupResponse { user_id },
        )),
    ))
}

/// POST /api/login/
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let email = require_text(payload.email, "email")?;
    let password = require_password(payload.password)?;

    let result = state.account_service().login(&email, &password).await?;

    Ok(Json(ApiResponse::with_message("Login successful", result)))
}

/// GET /api/edit-user/?user_id=<id>
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EditUserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    let user_id = user_id_from_query(query)?;
    let user = state.account_service().get_profile(user_id).await?;
    Ok(Json(ApiResponse::success(UserPayload { user })))
}

/// PUT /api/edit-user/?user_id=<id>
pub async fn edit_user(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EditUserQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<EditUserRequest>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    let user_id = user_id_from_query(query)?;
    let changes = payload.into_changes()?;

    let user = state
        .account_service()
        .update_profile(user_id, changes)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "User updated successfully",
        UserPayload { user },
    )))
}

/// DELETE /api/delete-user/
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<DeleteUserRequest>,
) -> Result<Json<ApiResponse<super::Empty>>, ApiError> {
    let requester_id = require_id(payload.requester_id, "requester_id")?;
    let target_user_id = require_id(payload.target_user_id, "target_user_id")?;

    state
        .account_service()
        .delete_user(requester_id, target_user_id)
        .await?;

    Ok(Json(ApiResponse::message("User deleted successfully")))
}

// ============================================================================
// Helpers
// ============================================================================

fn user_id_from_query(query: Result<Query<EditUserQuery>, QueryRejection>) -> Result<i32, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::validation("user_id query parameter is required"))?;
    validate_id(user_id, "user_id")
}
