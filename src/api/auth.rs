use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::{validate_email, validate_password, validate_username};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::services::{AuthError, Claims, LoginResult, RegisterUser};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Self::unauthorized(err.to_string())
            }
            AuthError::Conflict => Self::conflict(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Persistence(msg) => Self::persistence(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid `Authorization: Bearer <token>` header when
/// `security.enforce_auth` is set. The decoded [`Claims`] are attached to the
/// request for [`require_admin`] and the caller's id is recorded on the
/// request span opened by the logging middleware.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config().security.enforce_auth {
        return Ok(next.run(request).await);
    }

    let token = extract_bearer_token(&headers).ok_or(AuthError::InvalidToken)?;
    let claims = state.auth_service().verify_token(token)?;

    tracing::Span::current().record("user_id", claims.user_id);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Rejects callers whose token does not carry the admin role. Must run after
/// [`authenticate`].
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config().security.enforce_auth {
        return Ok(next.run(request).await);
    }

    match request.extensions().get::<Claims>() {
        Some(claims) if claims.role().is_admin() => Ok(next.run(request).await),
        Some(_) => Err(ApiError::forbidden("Admin role required")),
        None => Err(AuthError::InvalidToken.into()),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /login/
/// Exchanges a username and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /register/
/// Creates an account with the `user` role
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let input = RegisterUser {
        username: validate_username(&payload.username)?.to_string(),
        email: validate_email(&payload.email)?.to_string(),
        password: validate_password(&payload.password)?.to_string(),
    };

    let user = state.auth_service().register(input).await?;

    Ok(Json(ApiResponse::success(user.into())))
}
