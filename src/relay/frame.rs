use memchr::memchr;

/// Marker that introduces an event payload line.
pub const DATA_MARKER: &str = "data:";
/// Payload that some providers send to signal the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Reassembles upstream body chunks into complete lines.
///
/// Only the trailing, not yet terminated line is held between calls. Bytes
/// are buffered undecoded and each line is decoded on its own, so a
/// multi-byte character split across two chunks is never mangled.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, in order.
    /// Blank lines (event separators) are not returned.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = memchr(b'\n', &self.buffer[start..]) {
            let end = start + offset;
            if let Some(line) = decode_line(&self.buffer[start..end]) {
                lines.push(line);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Ends the stream and returns the unterminated remainder, if any.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }

    /// Bytes currently held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// A classified frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// JSON payload of a `data:` line.
    Data(&'a str),
    /// The termination sentinel.
    Done,
}

/// Classifies one line. Anything that is not a `data:` line (`event:`
/// names, `:` comments, stray text) yields `None` and is dropped.
pub fn classify(line: &str) -> Option<Frame<'_>> {
    let payload = line.strip_prefix(DATA_MARKER)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.trim() == DONE_SENTINEL {
        Some(Frame::Done)
    } else {
        Some(Frame::Data(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "data: {\"a\":1}\ndata: {\"b\":2}\n";

    fn parse_in_pieces(input: &[u8], cuts: &[usize]) -> Vec<String> {
        let mut parser = FrameParser::new();
        let mut lines = Vec::new();
        let mut last = 0;
        for &cut in cuts {
            lines.extend(parser.push(&input[last..cut]));
            last = cut;
        }
        lines.extend(parser.push(&input[last..]));
        lines.extend(parser.finish());
        lines
    }

    #[test]
    fn whole_input_yields_complete_lines() {
        let mut parser = FrameParser::new();
        let lines = parser.push(SAMPLE.as_bytes());
        assert_eq!(lines, vec!["data: {\"a\":1}", "data: {\"b\":2}"]);
        assert_eq!(parser.pending(), 0);
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn every_single_split_point_reassembles_identically() {
        let bytes = SAMPLE.as_bytes();
        let expected = parse_in_pieces(bytes, &[]);
        for cut in 0..=bytes.len() {
            assert_eq!(parse_in_pieces(bytes, &[cut]), expected, "split at {cut}");
        }
    }

    #[test]
    fn byte_at_a_time_feeding_reassembles_identically() {
        let bytes = SAMPLE.as_bytes();
        let cuts: Vec<usize> = (1..bytes.len()).collect();
        assert_eq!(parse_in_pieces(bytes, &cuts), vec!["data: {\"a\":1}", "data: {\"b\":2}"]);
    }

    #[test]
    fn partial_line_is_held_until_newline_arrives() {
        let mut parser = FrameParser::new();
        assert!(parser.push(b"data: {\"b").is_empty());
        assert_eq!(parser.pending(), 9);
        assert_eq!(parser.push(b"\":2}\n"), vec!["data: {\"b\":2}"]);
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn finish_returns_unterminated_tail_once() {
        let mut parser = FrameParser::new();
        assert!(parser.push(b"data: {\"x\":1}").is_empty());
        assert_eq!(parser.finish().as_deref(), Some("data: {\"x\":1}"));
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn crlf_and_blank_separators_are_normalised() {
        let mut parser = FrameParser::new();
        let lines = parser.push(b"event: ping\r\ndata: {}\r\n\r\n\n");
        assert_eq!(lines, vec!["event: ping", "data: {}"]);
    }

    #[test]
    fn multibyte_character_split_across_chunks_survives() {
        let line = "data: {\"text\":\"caf\u{e9} \u{1f600}\"}\n".as_bytes();
        let split = line.len() - 5; // inside the emoji
        let mut parser = FrameParser::new();
        assert!(parser.push(&line[..split]).is_empty());
        let lines = parser.push(&line[split..]);
        assert_eq!(lines, vec!["data: {\"text\":\"caf\u{e9} \u{1f600}\"}"]);
    }

    #[test]
    fn classify_extracts_payloads_and_drops_other_lines() {
        assert_eq!(classify("data: {\"a\":1}"), Some(Frame::Data("{\"a\":1}")));
        assert_eq!(classify("data:{\"a\":1}"), Some(Frame::Data("{\"a\":1}")));
        assert_eq!(classify("data: [DONE]"), Some(Frame::Done));
        assert_eq!(classify("event: content_block_delta"), None);
        assert_eq!(classify(": keep-alive"), None);
        assert_eq!(classify("garbage"), None);
    }
}
