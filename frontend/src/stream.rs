use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStream, ReadableStreamDefaultReader};

/// Decodes UTF-8 that arrives in arbitrary byte chunks, holding back an
/// incomplete trailing sequence until the rest of it arrives.
#[derive(Debug, Default)]
pub struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Truncated sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    /// Flushes whatever is left; an unfinished sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

fn js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {err:?}")
}

/// A locked body yielding byte chunks. `Ok(None)` means the body is done.
trait ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, String>;
    fn release(&mut self);
}

struct BodyReader(ReadableStreamDefaultReader);

impl ChunkSource for BodyReader {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, String> {
        let result = JsFuture::from(self.0.read())
            .await
            .map_err(|e| js_error("Stream read error", e))?;
        let done = Reflect::get(&result, &JsValue::from_str("done"))
            .map_err(|e| js_error("Malformed read result", e))?
            .as_bool()
            .unwrap_or(true);
        if done {
            return Ok(None);
        }
        let value = Reflect::get(&result, &JsValue::from_str("value"))
            .map_err(|e| js_error("Malformed read result", e))?;
        Ok(Some(Uint8Array::new(&value).to_vec()))
    }

    fn release(&mut self) {
        self.0.release_lock();
    }
}

/// Reads a fetch body to the end, handing each decoded piece of text to
/// `on_text` in arrival order.
pub async fn read_text_stream(
    body: ReadableStream,
    on_text: impl FnMut(String),
) -> Result<(), String> {
    let reader = BodyReader(body.get_reader().unchecked_into());
    drain(reader, on_text).await
}

/// Decodes every chunk of `source`. The source is released on every exit,
/// including a failed read.
async fn drain<S: ChunkSource>(
    mut source: S,
    mut on_text: impl FnMut(String),
) -> Result<(), String> {
    let mut decoder = Utf8Accumulator::default();
    let result: Result<(), String> = async {
        while let Some(bytes) = source.next_chunk().await? {
            let text = decoder.push(&bytes);
            if !text.is_empty() {
                on_text(text);
            }
        }
        Ok(())
    }
    .await;
    source.release();

    let tail = decoder.finish();
    if !tail.is_empty() {
        on_text(tail);
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use futures_util::FutureExt;

    use super::*;

    #[test]
    fn ascii_passes_straight_through() {
        let mut decoder = Utf8Accumulator::default();
        assert_eq!(decoder.push(b"Hello"), "Hello");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn split_multibyte_character_is_held_back() {
        let bytes = "caf\u{e9} \u{1f600}!".as_bytes();
        for cut in 0..=bytes.len() {
            let mut decoder = Utf8Accumulator::default();
            let mut out = decoder.push(&bytes[..cut]);
            out.push_str(&decoder.push(&bytes[cut..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, "caf\u{e9} \u{1f600}!", "cut at {cut}");
        }
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8Accumulator::default();
        assert_eq!(decoder.push(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn truncated_tail_is_flushed_lossily() {
        let mut decoder = Utf8Accumulator::default();
        assert_eq!(decoder.push(&[b'x', 0xe2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{fffd}");
    }

    struct FakeBody {
        chunks: Vec<Result<Vec<u8>, String>>,
        released: Rc<Cell<bool>>,
    }

    impl ChunkSource for FakeBody {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, String> {
            if self.chunks.is_empty() {
                return Ok(None);
            }
            self.chunks.remove(0).map(Some)
        }

        fn release(&mut self) {
            self.released.set(true);
        }
    }

    fn run_drain(chunks: Vec<Result<Vec<u8>, String>>) -> (Result<(), String>, String, bool) {
        let released = Rc::new(Cell::new(false));
        let body = FakeBody { chunks, released: released.clone() };
        let mut out = String::new();
        let result = drain(body, |piece| out.push_str(&piece))
            .now_or_never()
            .expect("fake body never suspends");
        (result, out, released.get())
    }

    #[test]
    fn finished_body_is_decoded_and_released() {
        let bytes = "na\u{ef}ve".as_bytes();
        let (result, out, released) =
            run_drain(vec![Ok(bytes[..3].to_vec()), Ok(bytes[3..].to_vec())]);
        assert_eq!(result, Ok(()));
        assert_eq!(out, "na\u{ef}ve");
        assert!(released);
    }

    #[test]
    fn failed_read_still_releases_the_body() {
        let (result, out, released) = run_drain(vec![
            Ok(b"partial".to_vec()),
            Err("Stream read error: reset".to_string()),
            Ok(b" never read".to_vec()),
        ]);
        assert_eq!(result, Err("Stream read error: reset".to_string()));
        assert_eq!(out, "partial");
        assert!(released);
    }
}
