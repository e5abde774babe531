use gloo_net::http::Request;
use web_sys::ReadableStream;

use crate::models::{ChatRequest, ConversationMessage, EnvStatus, ErrorBody};

/// Base URL of the relay server.
const API_BASE: &str = "http://localhost:3000";

/// Asks the relay whether its upstream credential is configured.
pub async fn fetch_env_status() -> Result<EnvStatus, String> {
    let resp = Request::get(&format!("{API_BASE}/api/check-env"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }

    resp.json::<EnvStatus>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Posts the conversation and returns the plain-text body stream.
pub async fn open_chat_stream(messages: &[ConversationMessage]) -> Result<ReadableStream, String> {
    let body = ChatRequest { messages };

    let resp = Request::post(&format!("{API_BASE}/api/chat"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        let status = resp.status();
        return Err(match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("Server error: {status}"),
        });
    }

    resp.body()
        .ok_or_else(|| "Failed to get response reader".to_string())
}
