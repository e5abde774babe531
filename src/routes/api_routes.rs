use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ChatRequest;
use crate::service::chat_service::ChatService;

/// POST `/api/chat` — relays the conversation upstream and streams back
/// plain assistant text.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn chat_handler(
    State(svc): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(status = rejection.status().as_u16(), "rejecting chat request");
            return AppError::malformed(rejection.body_text()).into_response();
        }
    };

    match svc.relay_chat(request.messages).await {
        Ok(stream) => (
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(err) => {
            warn!(status = err.status_code().as_u16(), "chat relay failed: {err}");
            err.into_response()
        }
    }
}

/// GET `/api/check-env` — reports whether the upstream credential is present
/// without revealing it.
pub async fn check_env_handler(State(svc): State<ChatService>) -> impl IntoResponse {
    Json(svc.env_status())
}
