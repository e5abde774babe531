use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::{ConversationMessage, EnvStatus, Role};
use crate::stream;

/// Seeded as the first message of every conversation and sent to the relay
/// with each request.
pub const SYSTEM_PROMPT: &str = "You are Claude 3-7 Sonnet, a helpful AI assistant. \
Respond in a clear, concise, and friendly manner.";

const SYSTEM_MESSAGE_ID: &str = "system-1";

/// Shared application state, provided via Leptos context. Every field is a
/// signal handle, so the state is `Copy`.
#[derive(Clone, Copy)]
pub struct AppState {
    pub messages: ReadSignal<Vec<ConversationMessage>>,
    pub is_loading: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,
    pub env_status: ReadSignal<Option<EnvStatus>>,

    pub set_messages: WriteSignal<Vec<ConversationMessage>>,
    pub set_is_loading: WriteSignal<bool>,
    pub set_error: WriteSignal<Option<String>>,
    pub set_env_status: WriteSignal<Option<EnvStatus>>,

    next_id: StoredValue<u64>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (messages, set_messages) = signal(seed_messages());
        let (is_loading, set_is_loading) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (env_status, set_env_status) = signal(None::<EnvStatus>);

        let state = Self {
            messages,
            is_loading,
            error,
            env_status,
            set_messages,
            set_is_loading,
            set_error,
            set_env_status,
            next_id: StoredValue::new(0),
        };

        provide_context(state);
        state
    }

    /// Drops the conversation and starts over from the system prompt.
    pub fn new_chat(&self) {
        if self.is_loading.get_untracked() {
            return;
        }
        self.set_messages.set(seed_messages());
        self.set_error.set(None);
    }

    /// Load the relay's credential status for the sidebar.
    pub fn load_env_status(&self) {
        let set_env_status = self.set_env_status;
        spawn_local(async move {
            match api::fetch_env_status().await {
                Ok(status) => set_env_status.set(Some(status)),
                Err(e) => log::error!("Failed to fetch env status: {e}"),
            }
        });
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.next_id.try_update_value(|n| {
            *n += 1;
            *n
        });
        format!("{prefix}-{}-{}", js_sys::Date::now() as u64, n.unwrap_or_default())
    }

    /// Send a message and stream the reply into an assistant placeholder.
    pub fn send_message(&self, text: String) {
        if text.trim().is_empty() || self.is_loading.get_untracked() {
            return;
        }

        let user_msg = ConversationMessage {
            role: Role::User,
            content: text,
            id: self.fresh_id("user"),
        };
        let assistant_id = self.fresh_id("assistant");

        let mut payload = self.messages.get_untracked();
        payload.push(user_msg.clone());

        self.set_messages.update(|msgs| {
            msgs.push(user_msg);
            msgs.push(ConversationMessage {
                role: Role::Assistant,
                content: String::new(),
                id: assistant_id.clone(),
            });
        });
        self.set_is_loading.set(true);
        self.set_error.set(None);

        let set_messages = self.set_messages;
        let set_is_loading = self.set_is_loading;
        let set_error = self.set_error;

        spawn_local(async move {
            let result = async {
                let body = api::open_chat_stream(&payload).await?;
                stream::read_text_stream(body, |piece| {
                    log::debug!("Received chunk of {} bytes", piece.len());
                    set_messages.update(|msgs| append_to_message(msgs, &assistant_id, &piece));
                })
                .await
            }
            .await;

            if let Err(e) = result {
                log::error!("Error sending message: {e}");
                set_error.set(Some(e));
                set_messages.update(|msgs| remove_message(msgs, &assistant_id));
            }
            set_is_loading.set(false);
        });
    }
}

/// A conversation holding only the system prompt.
pub fn seed_messages() -> Vec<ConversationMessage> {
    vec![ConversationMessage {
        role: Role::System,
        content: SYSTEM_PROMPT.to_string(),
        id: SYSTEM_MESSAGE_ID.to_string(),
    }]
}

/// Appends streamed text to the message with the given id. Unknown ids are
/// ignored, which happens if the conversation was reset mid-stream.
pub fn append_to_message(msgs: &mut [ConversationMessage], id: &str, text: &str) {
    if let Some(msg) = msgs.iter_mut().find(|m| m.id == id) {
        msg.content.push_str(text);
    }
}

pub fn remove_message(msgs: &mut Vec<ConversationMessage>, id: &str) {
    msgs.retain(|m| m.id != id);
}
