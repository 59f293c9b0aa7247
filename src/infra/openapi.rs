//! OpenAPI configuration.

use crate::api::{
    info::info_api,
    item::{item_api, item_model},
};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    info(title = "Inventory Service"),
    paths(
        info_api::info,
        item_api::list_items,
        item_api::create_item,
        item_api::get_item,
        item_api::update_item,
        item_api::delete_item,
        item_api::disable_item,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item_model::Item,
            item_model::ItemFields,
            item_model::Condition,
            crate::infra::error::ErrorBody
        )
    ),
    tags((name = "inventory", description = "Inventory item management"))
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/"));
        assert!(paths.contains_key("/inventory"));
        assert!(paths.contains_key("/inventory/{id}"));
        assert!(paths.contains_key("/inventory/{id}/disable"));
    }
}
