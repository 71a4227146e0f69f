use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{validate_email, validate_id, validate_password, validate_username};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::services::{CreateUser, UserError};

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => Self::not_found("User", id),
            UserError::Conflict => Self::conflict(err.to_string()),
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Persistence(msg) => Self::persistence(msg),
        }
    }
}

/// POST /users/
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let input = CreateUser {
        username: validate_username(&payload.username)?.to_string(),
        email: validate_email(&payload.email)?.to_string(),
        password: validate_password(&payload.password)?.to_string(),
        role: payload.role,
    };

    let user = state.user_service().create_user(input).await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// GET /users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("User", id)?;
    let user = state.user_service().get_user(id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// PATCH /users/{id}/role
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<RoleUpdate>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id("User", id)?;
    let user = state.user_service().update_role(id, &payload.role).await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("User", id)?;
    state.user_service().delete_user(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User {id} deleted"
    )))))
}
