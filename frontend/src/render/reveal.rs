use std::collections::VecDeque;
use std::time::Duration;

use super::chunker::{chunk_spans_from, Chunk, ChunkerConfig};

/// Time between two chunk reveals.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// No text yet; the waiting indicator is shown.
    Idle,
    /// Chunks are queued for reveal.
    Streaming,
    /// Every known chunk is visible.
    Settled,
}

/// What a text update did to the reveal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUpdate {
    /// Same text as before, or the state was cancelled. Nothing scheduled.
    Unchanged,
    /// Old text is a prefix of the new one; revealed chunks were kept.
    Extended { queued: usize },
    /// New text diverged; everything revealed was discarded.
    Restarted { queued: usize },
}

/// Progressive reveal of one message's text.
///
/// Driven by two ordered inputs: text updates and cadence ticks. The
/// revealed text is always `full_text[..cursor]`, a prefix of the text as
/// currently known.
#[derive(Debug, Clone)]
pub struct RevealState {
    config: ChunkerConfig,
    full_text: String,
    revealed: Vec<Chunk>,
    queue: VecDeque<Chunk>,
    cursor: usize,
    phase: RevealPhase,
    cancelled: bool,
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

impl RevealState {
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            full_text: String::new(),
            revealed: Vec::new(),
            queue: VecDeque::new(),
            cursor: 0,
            phase: RevealPhase::Idle,
            cancelled: false,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn revealed_text(&self) -> &str {
        &self.full_text[..self.cursor]
    }

    #[cfg(test)]
    pub fn revealed_chunks(&self) -> &[Chunk] {
        &self.revealed
    }

    /// Chunks waiting for a tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Feeds the latest full text of the message.
    pub fn update(&mut self, text: &str) -> TextUpdate {
        if self.cancelled || text == self.full_text {
            return TextUpdate::Unchanged;
        }

        let outcome = if text.starts_with(self.full_text.as_str()) {
            self.full_text = text.to_string();
            self.requeue();
            TextUpdate::Extended { queued: self.queue.len() }
        } else {
            self.full_text = text.to_string();
            self.revealed.clear();
            self.cursor = 0;
            self.requeue();
            TextUpdate::Restarted { queued: self.queue.len() }
        };
        self.phase = self.resting_phase();
        outcome
    }

    /// Reveals the next queued chunk, if any.
    pub fn tick(&mut self) -> Option<Chunk> {
        if self.cancelled {
            return None;
        }
        let next = self.queue.pop_front();
        if let Some(chunk) = next {
            self.cursor = chunk.end;
            self.revealed.push(chunk);
        }
        self.phase = self.resting_phase();
        next
    }

    /// Stops all further reveals. Whatever is visible stays visible.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.queue.clear();
    }

    /// Rebuilds the queue from the unrevealed tail of the text. The tail of
    /// a growing text may re-chunk differently, so it is never cached.
    fn requeue(&mut self) {
        self.queue = chunk_spans_from(
            &self.full_text,
            self.cursor,
            self.revealed.len(),
            &self.config,
        )
        .into();
    }

    fn resting_phase(&self) -> RevealPhase {
        if !self.queue.is_empty() {
            RevealPhase::Streaming
        } else if self.revealed.is_empty() {
            RevealPhase::Idle
        } else {
            RevealPhase::Settled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(state: &mut RevealState) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(chunk) = state.tick() {
            out.push(chunk.text(state.full_text()).to_string());
        }
        out
    }

    #[test]
    fn starts_idle_with_nothing_revealed() {
        let mut state = RevealState::default();
        assert_eq!(state.phase(), RevealPhase::Idle);
        assert_eq!(state.revealed_text(), "");
        assert_eq!(state.tick(), None);
        assert_eq!(state.phase(), RevealPhase::Idle);
    }

    #[test]
    fn reveals_one_chunk_per_tick_in_index_order() {
        let mut state = RevealState::default();
        let text = "First sentence here. Second one follows. Third closes it.";
        assert_eq!(state.update(text), TextUpdate::Extended { queued: 3 });
        assert_eq!(state.phase(), RevealPhase::Streaming);

        let first = state.tick().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(state.revealed_text(), "First sentence here.");

        let second = state.tick().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(state.revealed_text(), "First sentence here. Second one follows.");
        assert_eq!(state.phase(), RevealPhase::Streaming);

        assert_eq!(state.tick().unwrap().index, 2);
        assert_eq!(state.revealed_text(), text);
        assert_eq!(state.phase(), RevealPhase::Settled);
        assert_eq!(state.tick(), None);
    }

    #[test]
    fn identical_update_schedules_nothing() {
        let mut state = RevealState::default();
        state.update("Hello there. How are you?");
        drain(&mut state);
        assert_eq!(state.phase(), RevealPhase::Settled);

        assert_eq!(state.update("Hello there. How are you?"), TextUpdate::Unchanged);
        assert_eq!(state.pending(), 0);
        assert_eq!(state.tick(), None);
        assert_eq!(state.phase(), RevealPhase::Settled);
    }

    #[test]
    fn prefix_extension_keeps_revealed_chunks() {
        let mut state = RevealState::default();
        state.update("Hello there.");
        assert_eq!(drain(&mut state), vec!["Hello there."]);

        let update = state.update("Hello there. How are you?");
        assert_eq!(update, TextUpdate::Extended { queued: 1 });
        assert_eq!(state.phase(), RevealPhase::Streaming);
        assert_eq!(state.revealed_chunks().len(), 1);
        assert_eq!(state.revealed_text(), "Hello there.");

        let next = state.tick().unwrap();
        assert_eq!(next.index, 1);
        assert_eq!(state.revealed_text(), "Hello there. How are you?");
        assert_eq!(state.phase(), RevealPhase::Settled);
    }

    #[test]
    fn extension_mid_reveal_requeues_only_the_unrevealed_tail() {
        let mut state = RevealState::default();
        state.update("One. Two. Three");
        state.tick();
        assert_eq!(state.revealed_text(), "One.");

        // "Three" grows into a longer sentence before it was shown.
        assert_eq!(
            state.update("One. Two. Three is the end."),
            TextUpdate::Extended { queued: 2 }
        );
        assert_eq!(drain(&mut state), vec!["Two.", "Three is the end."]);
        let indices: Vec<usize> = state.revealed_chunks().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn divergent_update_restarts_from_first_chunk() {
        let mut state = RevealState::default();
        state.update("Alpha beta. Gamma delta.");
        state.tick();
        assert_eq!(state.revealed_text(), "Alpha beta.");

        let update = state.update("Completely different. Text now.");
        assert_eq!(update, TextUpdate::Restarted { queued: 2 });
        assert!(state.revealed_chunks().is_empty());
        assert_eq!(state.revealed_text(), "");

        let first = state.tick().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(state.revealed_text(), "Completely different.");
    }

    #[test]
    fn replacing_with_blank_text_returns_to_idle() {
        let mut state = RevealState::default();
        state.update("Something.");
        state.tick();
        assert_eq!(state.update(""), TextUpdate::Restarted { queued: 0 });
        assert_eq!(state.phase(), RevealPhase::Idle);
        assert_eq!(state.revealed_text(), "");
    }

    #[test]
    fn cancellation_stops_reveals_and_keeps_what_is_shown() {
        let mut state = RevealState::default();
        state.update("One. Two. Three.");
        state.tick();
        state.cancel();

        assert!(state.is_cancelled());
        assert_eq!(state.tick(), None);
        assert_eq!(state.revealed_text(), "One.");
        assert_eq!(state.update("One. Two. Three. Four."), TextUpdate::Unchanged);
        assert_eq!(state.tick(), None);
        assert_eq!(state.revealed_text(), "One.");
    }

    #[test]
    fn streamed_hello_settles_fully_revealed() {
        let mut state = RevealState::default();
        assert_eq!(state.update("Hel"), TextUpdate::Extended { queued: 1 });
        state.tick();
        assert_eq!(state.revealed_text(), "Hel");
        assert_eq!(state.phase(), RevealPhase::Settled);

        assert_eq!(state.update("Hello"), TextUpdate::Extended { queued: 1 });
        assert_eq!(state.phase(), RevealPhase::Streaming);
        state.tick();
        assert_eq!(state.revealed_text(), "Hello");
        assert_eq!(state.phase(), RevealPhase::Settled);
    }

    #[test]
    fn revealed_text_is_always_a_prefix_of_full_text() {
        let mut state = RevealState::default();
        let updates = [
            "The",
            "The quick brown",
            "The quick brown fox jumps over the lazy dog, then",
            "The quick brown fox jumps over the lazy dog, then naps.\n\n- a\n- b",
            "Totally new",
            "Totally new text.",
        ];
        for text in updates {
            state.update(text);
            state.tick();
            assert!(state.full_text().starts_with(state.revealed_text()));
        }
        drain(&mut state);
        assert_eq!(state.revealed_text(), "Totally new text.");
    }
}
