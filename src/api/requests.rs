use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse, RequestDto};
use crate::services::{CreateRequest, RequestError, RequestPatch};

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(id) => Self::not_found("Request", id),
            RequestError::UnknownUser(_) | RequestError::UnknownItem(_) => {
                Self::validation(err.to_string())
            }
            RequestError::Validation(msg) => Self::validation(msg),
            RequestError::Persistence(msg) => Self::persistence(msg),
        }
    }
}

/// POST /requests/
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateRequest>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let request = state.request_service().create_request(payload).await?;
    Ok(Json(ApiResponse::success(request.into())))
}

/// GET /requests/
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RequestDto>>>, ApiError> {
    let requests = state.request_service().list_requests().await?;
    Ok(Json(ApiResponse::success(
        requests.into_iter().map(RequestDto::from).collect(),
    )))
}

/// GET /requests/{id}/
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let id = validate_id("Request", id)?;
    let request = state.request_service().get_request(id).await?;
    Ok(Json(ApiResponse::success(request.into())))
}

/// PATCH /requests/{id}/
///
/// Setting `status` to `Approved` also checks the referenced item out.
pub async fn update_request(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<RequestPatch>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let id = validate_id("Request", id)?;
    let request = state.request_service().update_request(id, patch).await?;
    Ok(Json(ApiResponse::success(request.into())))
}

/// DELETE /requests/{id}/
pub async fn delete_request(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("Request", id)?;
    state.request_service().delete_request(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Request {id} deleted"
    )))))
}
