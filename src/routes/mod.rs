pub mod api_routes;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::chat_service::ChatService;
use api_routes::{chat_handler, check_env_handler};

pub fn router(chat_service: ChatService) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/check-env", get(check_env_handler))
        .layer(TraceLayer::new_for_http())
        // The wasm frontend is served from its own origin during development.
        .layer(CorsLayer::permissive())
        .with_state(chat_service)
}
