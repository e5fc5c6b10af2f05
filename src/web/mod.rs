// Web server — Axum JSON API in front of the ranking pipelines.
//
// Routes mirror the marketplace's existing endpoints so the current
// frontend can call them unchanged:
//
//   GET  /api/ai/suggestions  suggested posts
//   GET  /api/posts/feed-ai   recommended feed + top tags
//   POST /api/ai/outfit       outfit suggestions for a context
//
// Requester identity comes from the gateway in front of this service
// (see identity.rs); this server performs no authentication itself.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::Database;

pub mod handlers;
pub mod identity;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(db: Arc<dyn Database>, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState { db });

    let addr = format!("{bind}:{port}");
    info!("thriftfeed API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Routes that rank posts for a specific requester
    let user_api = Router::new()
        .route("/api/ai/suggestions", get(handlers::ai::get_suggestions))
        .route("/api/ai/outfit", post(handlers::ai::build_outfit))
        .route("/api/posts/feed-ai", get(handlers::feed::get_feed))
        .layer(axum::middleware::from_fn(identity::require_user));

    let public_api = Router::new().route("/health", get(health));

    Router::new()
        .merge(user_api)
        .merge(public_api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::HeaderName::from_static(identity::USER_HEADER),
                ]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check, always 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
