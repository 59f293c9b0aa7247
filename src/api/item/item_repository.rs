//! Types and functions for storing and loading items.

use super::item_model::{Item, ItemFields};
use crate::infra::{
    database::{DbPool, Tx},
    error::ApiResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt::Debug, sync::Arc};
use tokio::sync::RwLock;
use tracing::{instrument, Instrument};
use utoipa::IntoParams;

/// Which items to list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ItemFilter {
    /// Every item.
    #[default]
    All,
    /// Items in exactly this category.
    Category(String),
    /// Items with exactly this name.
    Name(String),
}

/// Query parameters for listing items.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only list items in this category. Takes precedence over `name`.
    category: Option<String>,
    /// Only list items with this name.
    name: Option<String>,
}

impl From<ListParams> for ItemFilter {
    fn from(params: ListParams) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        if let Some(category) = non_empty(params.category) {
            ItemFilter::Category(category)
        } else if let Some(name) = non_empty(params.name) {
            ItemFilter::Name(name)
        } else {
            ItemFilter::All
        }
    }
}

impl ItemFilter {
    /// Whether an item passes this filter.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Category(category) => &item.category == category,
            ItemFilter::Name(name) => &item.name == name,
        }
    }
}

/// Anything that can store items.
///
/// Each call is its own unit of work: it either happens completely or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Debug + Send + Sync {
    /// Stores a new item and assigns it an id.
    async fn create_item(&self, fields: ItemFields) -> ApiResult<Item>;

    /// Fetches an item.
    async fn fetch_item(&self, id: i32) -> ApiResult<Option<Item>>;

    /// Lists the items that pass a filter, ordered by id.
    async fn list_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>>;

    /// Replaces everything but the id of an item, if it exists.
    async fn update_item(&self, id: i32, fields: ItemFields) -> ApiResult<Option<Item>>;

    /// Sets the quantity of an item to zero, if it exists.
    async fn disable_item(&self, id: i32) -> ApiResult<Option<Item>>;

    /// Deletes an item. Returns whether anything was deleted.
    async fn delete_item(&self, id: i32) -> ApiResult<bool>;
}

/// An [`ItemStore`] backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgItemStore {
    db: DbPool,
}

impl PgItemStore {
    /// Creates a new store.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    async fn begin(&self) -> ApiResult<Tx> {
        Ok(self.db.begin().await?)
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self))]
    async fn create_item(&self, fields: ItemFields) -> ApiResult<Item> {
        tracing::info!("Creating item {:?}", fields);
        let mut tx = self.begin().await?;
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, category, quantity, condition)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, quantity, condition
            "#,
        )
        .bind(fields.name)
        .bind(fields.category)
        .bind(fields.quantity)
        .bind(fields.condition)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn fetch_item(&self, id: i32) -> ApiResult<Option<Item>> {
        tracing::info!("Reading item");
        let mut tx = self.begin().await?;
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, category, quantity, condition FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .instrument(tracing::info_span!("fetch_optional"))
        .await?;
        tx.commit().await?;
        tracing::info!("Found item: {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn list_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>> {
        tracing::info!("Listing items");
        let mut tx = self.begin().await?;
        let query = match filter {
            ItemFilter::All => sqlx::query_as::<_, Item>(
                r#"
                SELECT id, name, category, quantity, condition FROM items
                ORDER BY id
                "#,
            ),
            ItemFilter::Category(category) => sqlx::query_as::<_, Item>(
                r#"
                SELECT id, name, category, quantity, condition FROM items
                WHERE category = $1
                ORDER BY id
                "#,
            )
            .bind(category),
            ItemFilter::Name(name) => sqlx::query_as::<_, Item>(
                r#"
                SELECT id, name, category, quantity, condition FROM items
                WHERE name = $1
                ORDER BY id
                "#,
            )
            .bind(name),
        };
        let items = query
            .fetch_all(&mut *tx)
            .instrument(tracing::info_span!("fetch_all"))
            .await?;
        tx.commit().await?;
        tracing::info!("Listed {} items", items.len());
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn update_item(&self, id: i32, fields: ItemFields) -> ApiResult<Option<Item>> {
        tracing::info!("Updating item");
        let mut tx = self.begin().await?;
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $2, category = $3, quantity = $4, condition = $5
            WHERE id = $1
            RETURNING id, name, category, quantity, condition
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.category)
        .bind(fields.quantity)
        .bind(fields.condition)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!("Updated item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn disable_item(&self, id: i32) -> ApiResult<Option<Item>> {
        tracing::info!("Disabling item");
        let mut tx = self.begin().await?;
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET quantity = 0
            WHERE id = $1
            RETURNING id, name, category, quantity, condition
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!("Disabled item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, id: i32) -> ApiResult<bool> {
        tracing::info!("Deleting item");
        let mut tx = self.begin().await?;
        let rows = sqlx::query(
            r#"
            DELETE FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        let deleted = rows.rows_affected() > 0;
        tracing::info!(deleted, "Deleted item");
        Ok(deleted)
    }
}

#[derive(Debug, Default)]
struct Items {
    last_id: i32,
    by_id: BTreeMap<i32, Item>,
}

/// An [`ItemStore`] that lives in memory.
///
/// Ids are never reused, even after a delete.
#[derive(Clone, Debug, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<Items>>,
}

impl InMemoryItemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    #[instrument(skip(self))]
    async fn create_item(&self, fields: ItemFields) -> ApiResult<Item> {
        let mut items = self.items.write().await;
        items.last_id += 1;
        let item = Item::from_fields(items.last_id, fields);
        items.by_id.insert(item.id, item.clone());
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn fetch_item(&self, id: i32) -> ApiResult<Option<Item>> {
        Ok(self.items.read().await.by_id.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .by_id
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn update_item(&self, id: i32, fields: ItemFields) -> ApiResult<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.by_id.get_mut(&id).map(|item| {
            *item = Item::from_fields(id, fields);
            item.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn disable_item(&self, id: i32) -> ApiResult<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.by_id.get_mut(&id).map(|item| {
            item.quantity = 0;
            item.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, id: i32) -> ApiResult<bool> {
        Ok(self.items.write().await.by_id.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::item::item_model::Condition;
    use sqlx::PgPool;

    fn fields(name: &str, category: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            category: category.to_string(),
            quantity: 3,
            condition: Condition::New,
        }
    }

    #[test]
    fn category_takes_precedence_over_name() {
        let params = ListParams {
            category: Some("shirt".to_string()),
            name: Some("blue shirt".to_string()),
        };
        assert_eq!(
            ItemFilter::Category("shirt".to_string()),
            ItemFilter::from(params)
        );
    }

    #[test]
    fn empty_params_are_ignored() {
        let params = ListParams {
            category: Some(String::new()),
            name: Some("socks".to_string()),
        };
        assert_eq!(ItemFilter::Name("socks".to_string()), ItemFilter::from(params));
        assert_eq!(ItemFilter::All, ItemFilter::from(ListParams::default()));
    }

    #[tokio::test]
    async fn in_memory_lifecycle() {
        let store = InMemoryItemStore::new();
        let item = store.create_item(fields("blue shirt", "shirt")).await.unwrap();
        assert_eq!(1, item.id);
        assert_eq!(Some(item.clone()), store.fetch_item(item.id).await.unwrap());

        let updated = store
            .update_item(item.id, fields("blue shirt", "unknown"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.id, updated.id);
        assert_eq!("unknown", updated.category);

        let disabled = store.disable_item(item.id).await.unwrap().unwrap();
        assert_eq!(0, disabled.quantity);

        assert!(store.delete_item(item.id).await.unwrap());
        assert!(!store.delete_item(item.id).await.unwrap());
        assert_eq!(None, store.fetch_item(item.id).await.unwrap());
        assert_eq!(None, store.update_item(item.id, fields("a", "b")).await.unwrap());
        assert_eq!(None, store.disable_item(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_ids_are_not_reused() {
        let store = InMemoryItemStore::new();
        let first = store.create_item(fields("a", "x")).await.unwrap();
        store.delete_item(first.id).await.unwrap();
        let second = store.create_item(fields("a", "x")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn in_memory_filters() {
        let store = InMemoryItemStore::new();
        store.create_item(fields("A", "X")).await.unwrap();
        store.create_item(fields("B", "X")).await.unwrap();
        store.create_item(fields("A", "Y")).await.unwrap();

        let all = store.list_items(&ItemFilter::All).await.unwrap();
        assert_eq!(vec![1, 2, 3], all.iter().map(|i| i.id).collect::<Vec<_>>());

        let x = store
            .list_items(&ItemFilter::Category("X".to_string()))
            .await
            .unwrap();
        assert_eq!(2, x.len());

        let a = store
            .list_items(&ItemFilter::Name("A".to_string()))
            .await
            .unwrap();
        assert!(a.iter().all(|i| i.name == "A"));
        assert_eq!(2, a.len());

        let lower = store
            .list_items(&ItemFilter::Name("a".to_string()))
            .await
            .unwrap();
        assert!(lower.is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn postgres_lifecycle(db: PgPool) {
        let store = PgItemStore::new(db);
        let item = store.create_item(fields("blue shirt", "shirt")).await.unwrap();
        assert_eq!(
            Item {
                id: item.id,
                name: "blue shirt".to_string(),
                category: "shirt".to_string(),
                quantity: 3,
                condition: Condition::New,
            },
            item
        );
        assert_eq!(Some(item.clone()), store.fetch_item(item.id).await.unwrap());

        let mut used = fields("blue shirt", "unknown");
        used.condition = Condition::Used;
        let updated = store.update_item(item.id, used).await.unwrap().unwrap();
        assert_eq!(item.id, updated.id);
        assert_eq!(Condition::Used, updated.condition);

        let disabled = store.disable_item(item.id).await.unwrap().unwrap();
        assert_eq!(0, disabled.quantity);

        assert!(store.delete_item(item.id).await.unwrap());
        assert!(!store.delete_item(item.id).await.unwrap());
        assert_eq!(None, store.fetch_item(item.id).await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn postgres_filters(db: PgPool) {
        let store = PgItemStore::new(db);
        store.create_item(fields("A", "X")).await.unwrap();
        store.create_item(fields("B", "X")).await.unwrap();
        store.create_item(fields("A", "Y")).await.unwrap();

        let x = store
            .list_items(&ItemFilter::Category("X".to_string()))
            .await
            .unwrap();
        assert_eq!(2, x.len());
        let a = store
            .list_items(&ItemFilter::Name("A".to_string()))
            .await
            .unwrap();
        assert_eq!(2, a.len());
        assert_eq!(3, store.list_items(&ItemFilter::All).await.unwrap().len());
    }
}
