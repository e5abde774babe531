use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One message of the client's conversation, in conversation order.
/// `id` is a client-side correlation token and is not forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Inbound body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ConversationMessage>,
}

// ── Upstream (Anthropic Messages API) ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UpstreamRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [UpstreamMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub max_tokens: u32,
    pub stream: bool,
}

// ── Diagnostics ──────────────────────────────────────────────────────────────

/// Body of `GET /api/check-env`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvStatus {
    pub anthropic_api_key: String,
    pub configured: bool,
}
