//! Domain service for lendable equipment.

use serde::Deserialize;
use thiserror::Error;

use crate::db::Item;

pub const DEFAULT_SERIAL_NUMBER: &str = "0000";
pub const DEFAULT_CONDITION: &str = "New";
pub const DEFAULT_LOCATION: &str = "School";
pub const DEFAULT_PHOTO_URL: &str = "/";

/// Errors specific to item operations.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

/// Payload for creating an item. Only `name` and `type` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Allow-listed fields accepted by a partial update. Anything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
}

/// Domain service trait for items.
#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Item>, ItemError>;

    async fn get_item(&self, id: i32) -> Result<Item, ItemError>;

    /// Creates an item, filling unset columns with their defaults.
    async fn create_item(&self, input: CreateItem) -> Result<Item, ItemError>;

    /// Updates only the fields present in the patch.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Validation`] if the patch has no recognized field.
    async fn update_item(&self, id: i32, patch: ItemPatch) -> Result<Item, ItemError>;

    async fn delete_item(&self, id: i32) -> Result<(), ItemError>;
}
