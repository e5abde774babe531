use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Relay-level failures. Every variant turns into a structured JSON body;
/// none of them takes the process down.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Inbound ──────────────────────────────────────────────────────────────
    #[error("Invalid chat request: {message}")]
    RequestMalformed { message: String },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingCredential,

    // ── Upstream provider ────────────────────────────────────────────────────
    #[error("Upstream provider unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("Upstream API error: {body}")]
    UpstreamRejected { status: StatusCode, body: String },

    #[error("Failed to create response stream")]
    StreamUnavailable,
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AppError::RequestMalformed { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RequestMalformed { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingCredential | AppError::StreamUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamRejected { status, .. } => *status,
        }
    }

    /// Upstream error payload, as JSON when the provider sent JSON.
    fn upstream_payload(&self) -> Option<Value> {
        match self {
            AppError::UpstreamRejected { body, .. } => Some(
                serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())),
            ),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.to_string() });
        if let Some(payload) = self.upstream_payload() {
            body["upstream"] = payload;
        }
        (self.status_code(), Json(body)).into_response()
    }
}
