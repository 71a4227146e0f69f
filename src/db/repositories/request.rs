use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{items, requests, users};
use crate::models::{ItemStatus, RequestStatus};

pub use crate::entities::requests::Model as BorrowRequest;

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct RequestChanges {
    pub user_id: Option<i32>,
    pub item_id: Option<i32>,
    pub status: Option<RequestStatus>,
    pub reviewed_at: Option<String>,
}

impl RequestChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.item_id.is_none()
            && self.status.is_none()
            && self.reviewed_at.is_none()
    }
}

/// Result of a write that must reference an existing user and item.
#[derive(Debug)]
pub enum RequestWrite {
    Saved(BorrowRequest),
    NotFound,
    MissingUser(i32),
    MissingItem(i32),
}

pub struct RequestRepository {
    conn: DatabaseConnection,
}

impl RequestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<BorrowRequest>> {
        requests::Entity::find()
            .order_by_asc(requests::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list requests")
    }

    pub async fn get(&self, id: i32) -> Result<Option<BorrowRequest>> {
        requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query request by ID")
    }

    /// Inserts a request. An `Approved` request checks its item out in the
    /// same transaction.
    pub async fn create(
        &self,
        user_id: i32,
        item_id: i32,
        status: RequestStatus,
    ) -> Result<RequestWrite> {
        let txn = self.conn.begin().await?;

        if !user_exists(&txn, user_id).await? {
            return Ok(RequestWrite::MissingUser(user_id));
        }
        if !item_exists(&txn, item_id).await? {
            return Ok(RequestWrite::MissingItem(item_id));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let reviewed_at = status.is_reviewed().then(|| now.clone());

        let model = requests::ActiveModel {
            user_id: Set(user_id),
            item_id: Set(item_id),
            status: Set(status.as_str().to_string()),
            requested_at: Set(now),
            reviewed_at: Set(reviewed_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert request")?;

        if status == RequestStatus::Approved {
            check_out_item(&txn, item_id).await?;
        }

        txn.commit().await?;
        Ok(RequestWrite::Saved(model))
    }

    /// Applies a partial update. Setting the status to `Approved` checks the
    /// referenced item out; no other transition touches the item.
    pub async fn update(&self, id: i32, changes: RequestChanges) -> Result<RequestWrite> {
        let txn = self.conn.begin().await?;

        let Some(existing) = requests::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query request for update")?
        else {
            return Ok(RequestWrite::NotFound);
        };

        if let Some(user_id) = changes.user_id
            && !user_exists(&txn, user_id).await?
        {
            return Ok(RequestWrite::MissingUser(user_id));
        }
        if let Some(item_id) = changes.item_id
            && !item_exists(&txn, item_id).await?
        {
            return Ok(RequestWrite::MissingItem(item_id));
        }

        let previous_status = existing.status.clone();
        let item_id = changes.item_id.unwrap_or(existing.item_id);

        let mut active: requests::ActiveModel = existing.into();
        if let Some(user_id) = changes.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(item_id) = changes.item_id {
            active.item_id = Set(item_id);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());

            if changes.reviewed_at.is_none()
                && status.is_reviewed()
                && previous_status != status.as_str()
            {
                active.reviewed_at = Set(Some(chrono::Utc::now().to_rfc3339()));
            }
        }
        if let Some(reviewed_at) = changes.reviewed_at {
            active.reviewed_at = Set(Some(reviewed_at));
        }

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update request")?;

        if changes.status == Some(RequestStatus::Approved) {
            check_out_item(&txn, item_id).await?;
        }

        txn.commit().await?;
        Ok(RequestWrite::Saved(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = requests::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete request")?;

        Ok(result.rows_affected > 0)
    }
}

async fn user_exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool> {
    let user = users::Entity::find_by_id(id)
        .one(conn)
        .await
        .context("Failed to query request user")?;
    Ok(user.is_some())
}

async fn item_exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool> {
    let item = items::Entity::find_by_id(id)
        .one(conn)
        .await
        .context("Failed to query request item")?;
    Ok(item.is_some())
}

async fn check_out_item<C: ConnectionTrait>(conn: &C, item_id: i32) -> Result<()> {
    items::ActiveModel {
        id: sea_orm::ActiveValue::Unchanged(item_id),
        status: Set(ItemStatus::CheckedOut.as_str().to_string()),
        ..Default::default()
    }
    .update(conn)
    .await
    .context("Failed to check out requested item")?;

    tracing::info!(item_id, "Item checked out by approved request");
    Ok(())
}
