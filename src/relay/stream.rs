use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use tracing::{debug, trace, warn};

use super::delta::extract_fragment;
use super::frame::{classify, Frame, FrameParser};

struct RelayState<S> {
    upstream: Pin<Box<S>>,
    parser: FrameParser,
    ready: VecDeque<String>,
    finished: bool,
    fragments: usize,
}

impl<S> RelayState<S> {
    fn accept_line(&mut self, line: &str) {
        let payload = match classify(line) {
            Some(Frame::Data(payload)) => payload,
            Some(Frame::Done) | None => return,
        };
        match extract_fragment(payload) {
            Ok(Some(fragment)) => self.ready.push_back(fragment),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, len = line.len(), "skipping malformed upstream frame");
                trace!(line, "malformed frame contents");
            }
        }
    }
}

/// Turns an upstream event-stream body into a plain text byte stream.
///
/// Fragments are emitted in the order the upstream produced them. Frames
/// that fail to parse are logged and skipped. The output ends once, after
/// the upstream body is exhausted and its unterminated tail (if any) has
/// been parsed. A transport error is forwarded and ends the stream.
pub fn relay_text<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = RelayState {
        upstream: Box::pin(upstream),
        parser: FrameParser::new(),
        ready: VecDeque::new(),
        finished: false,
        fragments: 0,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.ready.pop_front() {
                state.fragments += 1;
                return Some((Ok(Bytes::from(fragment)), state));
            }
            if state.finished {
                return None;
            }
            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    for line in state.parser.push(&chunk) {
                        state.accept_line(&line);
                    }
                }
                Some(Err(e)) => {
                    warn!(fragments = state.fragments, "upstream body failed mid-stream");
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    trace!(pending = state.parser.pending(), "flushing frame buffer");
                    if let Some(tail) = state.parser.finish() {
                        state.accept_line(&tail);
                    }
                    state.finished = true;
                    debug!(
                        fragments = state.fragments + state.ready.len(),
                        "upstream body exhausted"
                    );
                }
            }
        }
    })
}
