//! The inventory service.

use inventory_service::{
    api::item::{
        item_repository::{InMemoryItemStore, ItemStore, PgItemStore},
        item_service::ItemService,
    },
    app,
    infra::{
        config::{self, StorageKind},
        database, logging,
        state::AppState,
    },
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let config = config::load_config()?;
    let _guard = logging::init_logging(&config.logging);

    let store: Arc<dyn ItemStore> = match config.storage.kind {
        StorageKind::Postgres => {
            let db = database::init_db(&config.database);
            database::migrate(&db).await?;
            Arc::new(PgItemStore::new(db))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage, items are lost on shutdown");
            Arc::new(InMemoryItemStore::new())
        }
    };

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    let state = AppState::new(ItemService::new(store), config);
    app::run_app(listener, state).await?;

    Ok(())
}
