//! Global application state.
//!
//! Handlers pick the part they need with `State<T>`, courtesy of [`FromRef`].

use super::config::Config;
use crate::api::item::item_service::ItemService;
use axum::extract::FromRef;

/// Global application state.
#[derive(Clone, Debug, FromRef)]
pub struct AppState {
    items: ItemService,
    config: Config,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(items: ItemService, config: Config) -> Self {
        Self { items, config }
    }

    /// Returns the application configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
