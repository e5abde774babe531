use serde::{Deserialize, Serialize};

/// Matches the backend `MessageRole`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Matches the backend `ConversationMessage`. The id ties the assistant
/// placeholder to the text streamed into it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    pub id: String,
}

/// Request body for `POST /api/chat`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ConversationMessage],
}

/// JSON error body returned by the relay.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response from `GET /api/check-env`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvStatus {
    pub anthropic_api_key: String,
    #[serde(default)]
    pub configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serialises_roles_lowercase() {
        let messages = vec![ConversationMessage {
            role: Role::User,
            content: "Hi".into(),
            id: "user-1".into(),
        }];
        let json = serde_json::to_string(&ChatRequest { messages: &messages }).unwrap();
        assert_eq!(json, r#"{"messages":[{"role":"user","content":"Hi","id":"user-1"}]}"#);
    }

    #[test]
    fn env_status_reads_camel_case() {
        let status: EnvStatus =
            serde_json::from_str(r#"{"anthropicApiKey":"Not set","configured":false}"#).unwrap();
        assert_eq!(status.anthropic_api_key, "Not set");
        assert!(!status.configured);
    }
}
