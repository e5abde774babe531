//! Progressive, chunk-by-chunk display of streamed assistant text.

pub mod chunker;
pub mod markdown;
pub mod reveal;

pub use markdown::render_markdown;
pub use reveal::{RevealPhase, RevealState, TextUpdate, DEFAULT_REVEAL_INTERVAL};
