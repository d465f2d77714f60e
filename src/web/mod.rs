//! Web server module.

mod handlers;
mod ws;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::runner::CheckRunner;
use crate::scheduler::Scheduler;
use crate::store::{Store, StoreError};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<Store>,
    pub runner: Arc<CheckRunner>,
    pub scheduler: Option<Arc<Scheduler>>,
}

/// JSON error body for client errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Build the router with all routes.
pub fn routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::handle_health))
        // Devices
        .route(
            "/devices",
            get(handlers::handle_list_devices).post(handlers::handle_create_device),
        )
        .route(
            "/devices/{id}",
            get(handlers::handle_get_device)
                .patch(handlers::handle_update_device)
                .delete(handlers::handle_delete_device),
        )
        // Layouts
        .route(
            "/layouts",
            get(handlers::handle_list_layouts).post(handlers::handle_create_layout),
        )
        .route(
            "/layouts/{id}",
            get(handlers::handle_get_layout)
                .patch(handlers::handle_update_layout)
                .delete(handlers::handle_delete_layout),
        )
        // Links
        .route(
            "/links",
            get(handlers::handle_list_links).post(handlers::handle_create_link),
        )
        .route(
            "/links/{id}",
            get(handlers::handle_get_link)
                .patch(handlers::handle_update_link)
                .delete(handlers::handle_delete_link),
        )
        // Checks
        .route(
            "/checks",
            get(handlers::handle_list_checks).post(handlers::handle_create_check),
        )
        .route(
            "/checks/{id}",
            get(handlers::handle_get_check)
                .patch(handlers::handle_update_check)
                .delete(handlers::handle_delete_check),
        )
        .route("/checks/{id}/run", post(handlers::handle_run_check))
        // Streaming stub
        .route("/ws/updates", get(ws::handle_ws_updates))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Web server for monotaur.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(
        config: ServerConfig,
        store: Arc<Store>,
        runner: Arc<CheckRunner>,
        scheduler: Option<Arc<Scheduler>>,
    ) -> Self {
        Self {
            state: AppState {
                config,
                store,
                runner,
                scheduler,
            },
        }
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = routes(self.state.clone());

        tracing::info!("web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
