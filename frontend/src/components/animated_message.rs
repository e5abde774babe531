use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gloo_timers::future::sleep;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::render::{render_markdown, RevealPhase, RevealState, TextUpdate, DEFAULT_REVEAL_INTERVAL};

/// Assistant reply that reveals its text chunk by chunk while it streams in.
#[component]
pub fn AnimatedMessage(#[prop(into)] text: Signal<String>) -> impl IntoView {
    let reveal = RwSignal::new(RevealState::default());
    let running = Arc::new(AtomicBool::new(false));
    let cancelled = Arc::new(AtomicBool::new(false));

    {
        let running = running.clone();
        let cancelled = cancelled.clone();
        Effect::new(move |_| {
            let latest = text.get();
            let update = reveal
                .try_update(|r| r.update(&latest))
                .unwrap_or(TextUpdate::Unchanged);
            let queued = match update {
                TextUpdate::Unchanged => 0,
                TextUpdate::Extended { queued } => queued,
                TextUpdate::Restarted { queued } => {
                    log::debug!("message text diverged, restarting reveal");
                    queued
                }
            };
            if queued > 0 {
                start_cadence(reveal, running.clone(), cancelled.clone(), DEFAULT_REVEAL_INTERVAL);
            }
        });
    }

    on_cleanup(move || {
        cancelled.store(true, Ordering::Relaxed);
        reveal.try_update(|r| r.cancel());
    });

    view! {
        <div class="message assistant">
            <div class="role-label">"assistant"</div>
            {move || {
                let state = reveal.read();
                if state.phase() == RevealPhase::Idle {
                    view! { <div class="waiting">"Waiting for response..."</div> }.into_any()
                } else {
                    let html = render_markdown(state.revealed_text());
                    let streaming = state.phase() == RevealPhase::Streaming;
                    view! {
                        <div class="markdown" class:streaming-cursor=streaming inner_html=html></div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}

/// Reveals one queued chunk per period until the queue drains. At most one
/// loop runs per message; a later update restarts it once it has stopped.
fn start_cadence(
    reveal: RwSignal<RevealState>,
    running: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    period: Duration,
) {
    if running.swap(true, Ordering::Relaxed) {
        return;
    }
    spawn_local(async move {
        loop {
            sleep(period).await;
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let more = reveal.try_update(|r| {
                r.tick();
                r.pending() > 0
            });
            if more != Some(true) {
                break;
            }
        }
        running.store(false, Ordering::Relaxed);
    });
}
