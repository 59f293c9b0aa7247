//! A service for interacting with items.

use super::{
    item_model::{Item, ItemFields},
    item_repository::{ItemFilter, ItemStore},
};
use crate::infra::{
    error::{ApiError, ApiResult, ClientError},
    validation::Valid,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Item operations on top of some [`ItemStore`].
///
/// Ids come straight from the request path, so they may lie outside the
/// range the store hands out. Such ids name no item.
#[derive(Clone, Debug)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    /// Creates a service using the given store.
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Creates a new item.
    #[instrument(skip(self))]
    pub async fn create_item(&self, fields: Valid<ItemFields>) -> ApiResult<Item> {
        self.store.create_item(fields.into_inner()).await
    }

    /// Reads an item.
    #[instrument(skip(self))]
    pub async fn read_item(&self, id: i64) -> ApiResult<Item> {
        let stored_id = stored_id(id).ok_or_else(|| not_found(id))?;
        self.store
            .fetch_item(stored_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Lists items.
    #[instrument(skip(self))]
    pub async fn list_items(&self, filter: ItemFilter) -> ApiResult<Vec<Item>> {
        self.store.list_items(&filter).await
    }

    /// Updates an item from a request body. The id never changes.
    ///
    /// A missing item is reported before anything is said about the body.
    #[instrument(skip(self, body))]
    pub async fn update_item(&self, id: i64, body: &Value) -> ApiResult<Item> {
        let existing = self.read_item(id).await?;
        let fields = ItemFields::from_json(body)?;
        self.store
            .update_item(existing.id, fields.into_inner())
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes an item. Deleting a missing item is not an error.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: i64) -> ApiResult<()> {
        let deleted = match stored_id(id) {
            Some(stored_id) => self.store.delete_item(stored_id).await?,
            None => false,
        };
        if !deleted {
            tracing::info!("Item {} did not exist", id);
        }
        Ok(())
    }

    /// Marks an item as out of stock.
    #[instrument(skip(self))]
    pub async fn disable_item(&self, id: i64) -> ApiResult<Item> {
        let stored_id = stored_id(id).ok_or_else(|| not_found(id))?;
        self.store
            .disable_item(stored_id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn stored_id(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

fn not_found(id: i64) -> ApiError {
    tracing::warn!("Item {} not found", id);
    ClientError::NotFound.into()
}
