//! Domain service for borrow requests.
//!
//! A request moves between `Pending`, `Approved` and `Denied`. Approval checks
//! the referenced item out; denial and deletion leave the item untouched.

use serde::Deserialize;
use thiserror::Error;

use crate::db::BorrowRequest;

/// Errors specific to request operations.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request {0} not found")]
    NotFound(i32),

    #[error("User {0} does not exist")]
    UnknownUser(i32),

    #[error("Item {0} does not exist")]
    UnknownItem(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub user_id: i32,
    pub item_id: i32,
    #[serde(default)]
    pub status: Option<String>,
}

/// Allow-listed fields accepted by a partial update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestPatch {
    pub user_id: Option<i32>,
    pub item_id: Option<i32>,
    pub status: Option<String>,
    /// RFC 3339 timestamp
    pub reviewed_at: Option<String>,
}

/// Domain service trait for borrow requests.
#[async_trait::async_trait]
pub trait RequestService: Send + Sync {
    async fn list_requests(&self) -> Result<Vec<BorrowRequest>, RequestError>;

    async fn get_request(&self, id: i32) -> Result<BorrowRequest, RequestError>;

    /// Creates a request, `Pending` unless a status is given.
    async fn create_request(&self, input: CreateRequest) -> Result<BorrowRequest, RequestError>;

    /// Updates only the fields present in the patch.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] if the patch has no recognized field.
    async fn update_request(
        &self,
        id: i32,
        patch: RequestPatch,
    ) -> Result<BorrowRequest, RequestError>;

    async fn delete_request(&self, id: i32) -> Result<(), RequestError>;
}
