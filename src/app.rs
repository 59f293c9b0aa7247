//! The axum application.
//!
//! # Examples
//!
//! Create an item and fetch it again.
//!
//! ```rust
//! # use inventory_service::api::item::{item_model::Item, item_repository::InMemoryItemStore, item_service::ItemService};
//! # use inventory_service::{app, infra::{config, state::AppState}};
//! # use std::sync::Arc;
//! # tokio_test::block_on(async {
//! # let items = ItemService::new(Arc::new(InMemoryItemStore::new()));
//! # let state = AppState::new(items, config::load_config().unwrap());
//! # let url = app::spawn_app(state).await.unwrap();
//! let client = reqwest::Client::new();
//! let body = serde_json::json!({"name": "blue shirt", "category": "shirt", "quantity": 3});
//! let response = client.post(format!("{url}/inventory")).json(&body).send().await.unwrap();
//! assert_eq!(201, response.status());
//! let location = response.headers()["location"].to_str().unwrap().to_string();
//! let created = response.json::<Item>().await.unwrap();
//! let fetched = reqwest::get(format!("{url}{location}")).await.unwrap().json::<Item>().await.unwrap();
//! assert_eq!(created, fetched);
//! # });
//! ```

use crate::infra::error::{InternalError, PanicHandler};
use crate::infra::middleware::MakeRequestIdSpan;
use crate::infra::openapi::ApiDoc;
use crate::infra::shutdown::shutdown_signal;
use crate::infra::state::AppState;
use axum::error_handling::HandleErrorLayer;
use axum::response::IntoResponse;
use axum::Router;
use http::header::AUTHORIZATION;
use std::iter;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let request_timeout = state.config().server.request_timeout;

    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e| async move {
            InternalError::Other(format!("Tower middleware failed: {e}")).into_response()
        }))
        .concurrency_limit(500);

    // The REST API and its documentation.
    Router::new()
        .merge(crate::api::api(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/openapi.json").path("/rapidoc"))
        // Layers
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(
            crate::infra::middleware::log_request_response,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new(iter::once(
            AUTHORIZATION,
        )))
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
}

/// Starts the axum server and runs it until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = app(state).into_make_service();

    tracing::info!("Starting axum on {:?}", listener.local_addr());
    let exit_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &exit_result {
        Ok(_) => tracing::info!("Successfully shut down"),
        Err(e) => tracing::error!("Shutdown failed: {}", e),
    }

    exit_result
}

/// Spawn a server on a random port and return its base url.
pub async fn spawn_app(state: AppState) -> std::io::Result<String> {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(run_app(listener, state));
    Ok(format!("http://{address}:{port}"))
}
