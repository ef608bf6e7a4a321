//! Router configuration for the hearth HTTP surface.

use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::UserRepository;

use super::error::ApiError;
use super::ws::ws_handler;
use super::AppState;

/// Create the main router: the WebSocket endpoint plus the REST API.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let api_routes = Router::new().route("/users", get(list_users));

    Router::new()
        .route("/ws", get(ws_handler))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// User directory handler.
///
/// GET /api/users
///
/// Lists all known usernames sorted ascending; the client uses this to
/// populate its direct-message picker.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let usernames = UserRepository::new(state.db.pool())
        .list_usernames()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(usernames))
}

/// Create a CORS layer from configuration.
fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        // Development mode: allow any origin without credentials
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
            .allow_credentials(true)
            .allow_origin(parsed_origins)
    }
}
