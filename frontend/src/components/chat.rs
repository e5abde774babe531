use leptos::ev;
use leptos::prelude::*;

use crate::components::animated_message::AnimatedMessage;
use crate::models::Role;
use crate::state::AppState;

/// Main chat area with message history and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    let visible = move || {
        state
            .messages
            .get()
            .into_iter()
            .filter(|m| m.role != Role::System)
            .collect::<Vec<_>>()
    };

    view! {
        <main class="chat-area">
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner">{format!("Error: {err}")}</div>
                    }
                })
            }}

            <div class="messages-container">
                <Show
                    when=move || !visible().is_empty()
                    fallback=|| view! {
                        <div class="empty-state">"Start a conversation"</div>
                    }
                >
                    <For
                        each=visible
                        key=|m| m.id.clone()
                        let:msg
                    >
                        {
                            if msg.role == Role::User {
                                view! {
                                    <div class="message user">
                                        <div class="role-label">{msg.role.as_str()}</div>
                                        <div>{msg.content.clone()}</div>
                                    </div>
                                }
                                .into_any()
                            } else {
                                let id = msg.id.clone();
                                // Follows the placeholder's content as it streams in.
                                let text = Signal::derive(move || {
                                    state.messages.with(|msgs| {
                                        msgs.iter()
                                            .find(|m| m.id == id)
                                            .map(|m| m.content.clone())
                                            .unwrap_or_default()
                                    })
                                });
                                view! { <AnimatedMessage text=text /> }.into_any()
                            }
                        }
                    </For>
                </Show>
            </div>

            <ChatInput />
        </main>
    }
}

/// Chat input form with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.is_loading.get();

    let send = move || {
        let text = input.get_untracked().trim().to_string();
        if text.is_empty() || state.is_loading.get_untracked() {
            return;
        }
        set_input.set(String::new());
        state.send_message(text);
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type your message... (Enter to send, Shift+Enter for newline)"
                    prop:value=input
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    on:click=move |_| send()
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    {move || if is_sending() { "Sending..." } else { "Send" }}
                </button>
            </div>
        </div>
    }
}
