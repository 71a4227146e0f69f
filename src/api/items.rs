use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, ItemDto, MessageResponse};
use crate::services::{CreateItem, ItemError, ItemPatch};

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => Self::not_found("Item", id),
            ItemError::Validation(msg) => Self::validation(msg),
            ItemError::Persistence(msg) => Self::persistence(msg),
        }
    }
}

/// POST /items/
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateItem>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let item = state.item_service().create_item(payload).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// GET /items/
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ItemDto>>>, ApiError> {
    let items = state.item_service().list_items().await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(ItemDto::from).collect(),
    )))
}

/// GET /items/{id}/
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let id = validate_id("Item", id)?;
    let item = state.item_service().get_item(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// PATCH /items/{id}/
///
/// Only `name`, `type`, `serial_number`, `condition`, `status`, `location`
/// and `photo_url` are applied. A body with none of them is rejected.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> Result<Json<ApiResponse<ItemDto>>, ApiError> {
    let id = validate_id("Item", id)?;
    let item = state.item_service().update_item(id, patch).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// DELETE /items/{id}/
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("Item", id)?;
    state.item_service().delete_item(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Item {id} deleted"
    )))))
}
