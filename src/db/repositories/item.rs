use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};

use crate::entities::items;

pub use crate::entities::items::Model as Item;

/// Column values for a new item; defaults are filled in by the caller.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub item_type: String,
    pub serial_number: String,
    pub condition: String,
    pub status: String,
    pub location: String,
    pub photo_url: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
}

impl ItemChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.item_type.is_none()
            && self.serial_number.is_none()
            && self.condition.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.photo_url.is_none()
    }

    fn apply(self, active: &mut items::ActiveModel) {
        if let Some(v) = self.name {
            active.name = Set(v);
        }
        if let Some(v) = self.item_type {
            active.item_type = Set(v);
        }
        if let Some(v) = self.serial_number {
            active.serial_number = Set(v);
        }
        if let Some(v) = self.condition {
            active.condition = Set(v);
        }
        if let Some(v) = self.status {
            active.status = Set(v);
        }
        if let Some(v) = self.location {
            active.location = Set(v);
        }
        if let Some(v) = self.photo_url {
            active.photo_url = Set(v);
        }
    }
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Item>> {
        items::Entity::find()
            .order_by_asc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list items")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Item>> {
        items::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item by ID")
    }

    pub async fn create(&self, item: NewItem) -> Result<Item> {
        let txn = self.conn.begin().await?;

        let model = items::ActiveModel {
            name: Set(item.name),
            item_type: Set(item.item_type),
            serial_number: Set(item.serial_number),
            condition: Set(item.condition),
            status: Set(item.status),
            location: Set(item.location),
            photo_url: Set(item.photo_url),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert item")?;

        txn.commit().await?;
        Ok(model)
    }

    /// Returns `None` when the item does not exist.
    pub async fn update(&self, id: i32, changes: ItemChanges) -> Result<Option<Item>> {
        let txn = self.conn.begin().await?;

        let Some(item) = items::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query item for update")?
        else {
            return Ok(None);
        };

        let mut active: items::ActiveModel = item.into();
        changes.apply(&mut active);
        let updated = active.update(&txn).await.context("Failed to update item")?;

        txn.commit().await?;
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = items::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete item")?;

        Ok(result.rows_affected > 0)
    }
}
