//! APIs for getting information about the application.

use crate::infra::{extract::Json, state::AppState};
use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The info API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(info))
}

/// Application information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppInfo {
    /// The application name.
    #[schema(example = "inventory-service")]
    pub name: String,
    /// The application version.
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Where the items live.
    #[schema(example = "/inventory")]
    pub inventory: String,
    /// Where to read the API documentation.
    #[schema(example = "/swagger-ui")]
    pub docs: String,
}

/// Returns application information.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Success", body = AppInfo),
    )
)]
pub async fn info() -> Json<AppInfo> {
    Json(AppInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        inventory: "/inventory".to_string(),
        docs: "/swagger-ui".to_string(),
    })
}
