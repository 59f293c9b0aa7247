//! The REST API, one module per resource.

use crate::infra::state::AppState;
use axum::Router;

pub mod info;
pub mod item;

/// Constructs the REST API without middleware.
pub fn api(state: AppState) -> Router {
    Router::new()
        .merge(info::info_api::routes())
        .merge(item::item_api::routes())
        .with_state(state)
}
