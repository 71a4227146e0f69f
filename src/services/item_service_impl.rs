//! `SeaORM` implementation of the `ItemService` trait.

use async_trait::async_trait;

use crate::db::{Item, ItemChanges, NewItem, Store};
use crate::models::ItemStatus;
use crate::services::item_service::{
    CreateItem, DEFAULT_CONDITION, DEFAULT_LOCATION, DEFAULT_PHOTO_URL, DEFAULT_SERIAL_NUMBER,
    ItemError, ItemPatch, ItemService,
};

pub struct SeaOrmItemService {
    store: Store,
}

impl SeaOrmItemService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn parse_status(status: &str) -> Result<ItemStatus, ItemError> {
    status
        .parse::<ItemStatus>()
        .map_err(|e| ItemError::Validation(e.to_string()))
}

fn required(field: &str, value: String) -> Result<String, ItemError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemError::Validation(format!("Item {field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn list_items(&self) -> Result<Vec<Item>, ItemError> {
        Ok(self.store.list_items().await?)
    }

    async fn get_item(&self, id: i32) -> Result<Item, ItemError> {
        self.store.get_item(id).await?.ok_or(ItemError::NotFound(id))
    }

    async fn create_item(&self, input: CreateItem) -> Result<Item, ItemError> {
        let status = input
            .status
            .as_deref()
            .map_or(Ok(ItemStatus::default()), parse_status)?;

        let item = self
            .store
            .create_item(NewItem {
                name: required("name", input.name)?,
                item_type: required("type", input.item_type)?,
                serial_number: input
                    .serial_number
                    .unwrap_or_else(|| DEFAULT_SERIAL_NUMBER.to_string()),
                condition: input
                    .condition
                    .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
                status: status.as_str().to_string(),
                location: input.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
                photo_url: input
                    .photo_url
                    .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string()),
            })
            .await?;

        tracing::info!(item_id = item.id, name = %item.name, "Item created");
        Ok(item)
    }

    async fn update_item(&self, id: i32, patch: ItemPatch) -> Result<Item, ItemError> {
        let changes = ItemChanges {
            name: patch.name.map(|v| required("name", v)).transpose()?,
            item_type: patch.item_type.map(|v| required("type", v)).transpose()?,
            serial_number: patch.serial_number,
            condition: patch.condition,
            status: patch
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?
                .map(|s| s.as_str().to_string()),
            location: patch.location,
            photo_url: patch.photo_url,
        };

        if changes.is_empty() {
            return Err(ItemError::Validation(
                "No valid fields provided for update".to_string(),
            ));
        }

        self.store
            .update_item(id, changes)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    async fn delete_item(&self, id: i32) -> Result<(), ItemError> {
        if self.store.delete_item(id).await? {
            tracing::info!(item_id = id, "Item deleted");
            Ok(())
        } else {
            Err(ItemError::NotFound(id))
        }
    }
}
