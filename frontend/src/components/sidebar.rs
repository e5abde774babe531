use leptos::prelude::*;

use crate::state::AppState;

/// Sidebar with the "New Chat" button and the relay's credential status.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_new = move |_| state.new_chat();

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Chat Relay"</h2>
                <button
                    class="new-chat-btn"
                    on:click=on_new
                    disabled=move || state.is_loading.get()
                >
                    "+ New Chat"
                </button>
            </div>
            <div class="env-status">
                {move || match state.env_status.get() {
                    Some(status) => {
                        let missing = !status.configured;
                        view! {
                            <span class:missing=missing>
                                {format!("API key: {}", status.anthropic_api_key)}
                            </span>
                        }
                        .into_any()
                    }
                    None => view! { <span>"API key: checking..."</span> }.into_any(),
                }}
            </div>
        </aside>
    }
}
