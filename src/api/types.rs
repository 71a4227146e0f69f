use serde::Serialize;

use crate::db::{BorrowRequest, Item, User};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public view of a user. The password hash never leaves the store.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub serial_number: String,
    pub condition: String,
    pub status: String,
    pub location: String,
    pub photo_url: String,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            item_type: item.item_type,
            serial_number: item.serial_number,
            condition: item.condition,
            status: item.status,
            location: item.location,
            photo_url: item.photo_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestDto {
    pub id: i32,
    pub user_id: i32,
    pub item_id: i32,
    pub status: String,
    pub requested_at: String,
    pub reviewed_at: Option<String>,
}

impl From<BorrowRequest> for RequestDto {
    fn from(request: BorrowRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            item_id: request.item_id,
            status: request.status,
            requested_at: request.requested_at,
            reviewed_at: request.reviewed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
