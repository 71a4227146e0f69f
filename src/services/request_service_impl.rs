//! `SeaORM` implementation of the `RequestService` trait.

use async_trait::async_trait;

use crate::db::{BorrowRequest, RequestChanges, RequestWrite, Store};
use crate::models::RequestStatus;
use crate::services::request_service::{
    CreateRequest, RequestError, RequestPatch, RequestService,
};

pub struct SeaOrmRequestService {
    store: Store,
}

impl SeaOrmRequestService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn parse_status(status: &str) -> Result<RequestStatus, RequestError> {
    status
        .parse::<RequestStatus>()
        .map_err(|e| RequestError::Validation(e.to_string()))
}

fn parse_timestamp(value: &str) -> Result<String, RequestError> {
    chrono::DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.to_rfc3339())
        .map_err(|_| {
            RequestError::Validation(format!(
                "reviewed_at must be an RFC 3339 timestamp, got '{value}'"
            ))
        })
}

fn into_result(id: Option<i32>, write: RequestWrite) -> Result<BorrowRequest, RequestError> {
    match write {
        RequestWrite::Saved(request) => Ok(request),
        RequestWrite::NotFound => Err(RequestError::NotFound(id.unwrap_or_default())),
        RequestWrite::MissingUser(user_id) => Err(RequestError::UnknownUser(user_id)),
        RequestWrite::MissingItem(item_id) => Err(RequestError::UnknownItem(item_id)),
    }
}

#[async_trait]
impl RequestService for SeaOrmRequestService {
    async fn list_requests(&self) -> Result<Vec<BorrowRequest>, RequestError> {
        Ok(self.store.list_requests().await?)
    }

    async fn get_request(&self, id: i32) -> Result<BorrowRequest, RequestError> {
        self.store
            .get_request(id)
            .await?
            .ok_or(RequestError::NotFound(id))
    }

    async fn create_request(&self, input: CreateRequest) -> Result<BorrowRequest, RequestError> {
        let status = input
            .status
            .as_deref()
            .map_or(Ok(RequestStatus::default()), parse_status)?;

        let write = self
            .store
            .create_request(input.user_id, input.item_id, status)
            .await?;
        let request = into_result(None, write)?;

        tracing::info!(
            request_id = request.id,
            user_id = request.user_id,
            item_id = request.item_id,
            status = %status,
            "Borrow request created"
        );
        Ok(request)
    }

    async fn update_request(
        &self,
        id: i32,
        patch: RequestPatch,
    ) -> Result<BorrowRequest, RequestError> {
        let changes = RequestChanges {
            user_id: patch.user_id,
            item_id: patch.item_id,
            status: patch.status.as_deref().map(parse_status).transpose()?,
            reviewed_at: patch
                .reviewed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        };

        if changes.is_empty() {
            return Err(RequestError::Validation(
                "No valid fields provided for update".to_string(),
            ));
        }

        let write = self.store.update_request(id, changes).await?;
        let request = into_result(Some(id), write)?;

        tracing::info!(request_id = id, status = %request.status, "Borrow request updated");
        Ok(request)
    }

    async fn delete_request(&self, id: i32) -> Result<(), RequestError> {
        if self.store.delete_request(id).await? {
            tracing::info!(request_id = id, "Borrow request deleted");
            Ok(())
        } else {
            Err(RequestError::NotFound(id))
        }
    }
}
