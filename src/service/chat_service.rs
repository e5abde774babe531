use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::{ConversationMessage, EnvStatus, MessageRole, UpstreamMessage};
use crate::relay::relay_text;
use crate::upstream::AnthropicClient;

/// What actually goes upstream for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedChat {
    pub system: Option<String>,
    pub messages: Vec<UpstreamMessage>,
}

/// Splits the inbound conversation into the side-channel system instruction
/// (the first system message) and the ordered, non-empty, non-system turns.
pub fn prepare_messages(messages: Vec<ConversationMessage>) -> Result<PreparedChat, AppError> {
    let mut system = None;
    let mut forwarded = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            MessageRole::System => {
                if system.is_none() {
                    system = Some(message.content);
                }
            }
            role if !message.content.trim().is_empty() => forwarded.push(UpstreamMessage {
                role,
                content: message.content,
            }),
            _ => {}
        }
    }

    if forwarded.is_empty() {
        return Err(AppError::malformed("no non-empty user or assistant messages"));
    }

    Ok(PreparedChat { system, messages: forwarded })
}

#[derive(Clone)]
pub struct ChatService {
    client: AnthropicClient,
    log_payloads: bool,
}

impl ChatService {
    pub fn new(client: AnthropicClient, log_payloads: bool) -> Self {
        Self { client, log_payloads }
    }

    /// Forwards the conversation upstream and returns the relayed text stream.
    pub async fn relay_chat(
        &self,
        messages: Vec<ConversationMessage>,
    ) -> Result<BoxStream<'static, Result<Bytes, reqwest::Error>>, AppError> {
        let prepared = prepare_messages(messages)?;

        let roles: Vec<&str> = prepared.messages.iter().map(|m| m.role.as_str()).collect();
        info!(
            messages = prepared.messages.len(),
            has_system = prepared.system.is_some(),
            ?roles,
            "relaying chat turn"
        );
        if self.log_payloads {
            debug!(system = ?prepared.system, messages = ?prepared.messages, "chat payload");
        }

        let response = self
            .client
            .open_stream(prepared.system.as_deref(), &prepared.messages)
            .await?;

        Ok(relay_text(response.bytes_stream()).boxed())
    }

    pub fn env_status(&self) -> EnvStatus {
        match self.client.api_key() {
            Some(key) => EnvStatus {
                anthropic_api_key: format!("Set (first 4 chars: {}...)", key.hint()),
                configured: true,
            },
            None => EnvStatus {
                anthropic_api_key: "Not set".to_string(),
                configured: false,
            },
        }
    }
}
