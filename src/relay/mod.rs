//! Upstream event-stream to plain-text relay.

pub mod delta;
pub mod frame;
pub mod stream;

pub use stream::relay_text;
