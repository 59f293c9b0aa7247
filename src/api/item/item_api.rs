//! The inventory API implementation.

use super::{
    item_model::{Item, ItemFields},
    item_repository::ListParams,
    item_service::ItemService,
};
use crate::infra::{
    error::{ApiResult, ClientError, ErrorBody},
    extract::{Json, Query},
    state::AppState,
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use http::{header::LOCATION, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

/// The inventory API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_get(list_items)
        .typed_post(create_item)
        .typed_get(get_item)
        .typed_put(update_item)
        .typed_delete(delete_item)
        .typed_put(disable_item)
}

#[derive(Deserialize, TypedPath)]
/// The inventory collection.
#[typed_path("/inventory", rejection(ClientError))]
pub struct Inventory;

/// A single item.
///
/// Any `i64` is accepted. Ids the store never hands out name no item, and a
/// path that is not an integer yields 404.
#[derive(Deserialize, TypedPath)]
#[typed_path("/inventory/:id", rejection(ClientError))]
pub struct InventoryId(pub i64);

/// Disabling a single item.
#[derive(Deserialize, TypedPath)]
#[typed_path("/inventory/:id/disable", rejection(ClientError))]
pub struct InventoryIdDisable(pub i64);

/// Lists items, optionally filtered by category or name.
#[utoipa::path(
    get,
    path = "/inventory",
    params(ListParams),
    responses(
        (status = 200, description = "Ok", body = [Item]),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn list_items(
    Inventory: Inventory,
    State(items): State<ItemService>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = items.list_items(params.into()).await?;
    tracing::info!("Returning {} items", items.len());
    Ok(Json(items))
}

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/inventory",
    request_body = ItemFields,
    responses(
        (status = 201, description = "Created", body = Item,
            headers(("location" = String, description = "Where to fetch the new item"))),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 415, description = "Unsupported Media Type", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn create_item(
    Inventory: Inventory,
    State(items): State<ItemService>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, [(http::HeaderName, String); 1], Json<Item>)> {
    let fields = ItemFields::from_json(&body)?;
    let item = items.create_item(fields).await?;
    let location = InventoryId(item.id.into()).to_uri().to_string();
    tracing::info!("Item with id {} created", item.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(item)))
}

/// Gets an item.
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn get_item(
    InventoryId(id): InventoryId,
    State(items): State<ItemService>,
) -> ApiResult<Json<Item>> {
    let item = items.read_item(id).await?;
    Ok(Json(item))
}

/// Updates an item. Any id in the body is ignored.
///
/// A missing item is reported as 404 whatever the body contains.
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    request_body = ItemFields,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 415, description = "Unsupported Media Type", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn update_item(
    InventoryId(id): InventoryId,
    State(items): State<ItemService>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Item>> {
    let item = items.update_item(id, &body).await?;
    tracing::info!("Item with id {} updated", item.id);
    Ok(Json(item))
}

/// Deletes an item. Succeeds even if the item does not exist.
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 204, description = "No Content"),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn delete_item(
    InventoryId(id): InventoryId,
    State(items): State<ItemService>,
) -> ApiResult<StatusCode> {
    items.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Disables an item by setting its quantity to zero.
#[utoipa::path(
    put,
    path = "/inventory/{id}/disable",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn disable_item(
    InventoryIdDisable(id): InventoryIdDisable,
    State(items): State<ItemService>,
) -> ApiResult<Json<Item>> {
    let item = items.disable_item(id).await?;
    Ok(Json(item))
}
