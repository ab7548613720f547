use serde::Deserialize;

/// Prefix of every event-data line in the backend's stream.
pub const DATA_PREFIX: &str = "data: ";
/// Line that ends a generation.
pub const DONE_SENTINEL: &str = "data: [DONE]";
/// Longest unterminated line the relay holds before giving up on a stream.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// What one line of the backend's event stream means to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Blank separators, comments, event names, deltas without text
    Skip,
    Done,
    Token(String),
    /// A data line whose payload did not decode; carries the reason
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ChunkFrame {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Decode one line of an OpenAI-style streaming reply.
pub fn decode_line(line: &str) -> Frame {
    let line = line.trim();
    if line.is_empty() {
        return Frame::Skip;
    }
    if line == DONE_SENTINEL {
        return Frame::Done;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };

    match serde_json::from_str::<ChunkFrame>(payload) {
        Ok(chunk) => match chunk.choices.into_iter().next() {
            Some(choice) => choice.delta.content.map_or(Frame::Skip, Frame::Token),
            None => Frame::Malformed("frame has no choices".to_string()),
        },
        Err(e) => Frame::Malformed(e.to_string()),
    }
}

/// Reassembles lines from arbitrarily split network chunks.
///
/// Bytes are held until a newline arrives, so multi-byte characters split
/// across chunks decode correctly.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    // Bytes of `pending` already known to hold no newline
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and take every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
            from = start;
        }

        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Size of the line still waiting for its newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        self.scanned = 0;
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_token() {
        let line = r#"data: {"id":"1","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#;
        assert_eq!(decode_line(line), Frame::Token("Hel".to_string()));
    }

    #[test]
    fn test_decode_empty_token() {
        let line = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(decode_line(line), Frame::Token(String::new()));
    }

    #[test]
    fn test_role_only_delta_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(decode_line(line), Frame::Skip);

        let line = r#"data: {"choices":[{"delta":{"content":null},"finish_reason":"stop"}]}"#;
        assert_eq!(decode_line(line), Frame::Skip);
    }

    #[test]
    fn test_done_sentinel() {
        assert_eq!(decode_line("data: [DONE]"), Frame::Done);
        assert_eq!(decode_line("data: [DONE]\r"), Frame::Done);
    }

    #[test]
    fn test_blank_and_foreign_lines_are_skipped() {
        assert_eq!(decode_line(""), Frame::Skip);
        assert_eq!(decode_line("   "), Frame::Skip);
        assert_eq!(decode_line(": keep-alive"), Frame::Skip);
        assert_eq!(decode_line("event: completion"), Frame::Skip);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(decode_line("data: {not json"), Frame::Malformed(_)));
        assert!(matches!(
            decode_line(r#"data: {"choices":[]}"#),
            Frame::Malformed(_)
        ));
        assert!(matches!(
            decode_line(r#"data: {"choices":[{"text":"legacy"}]}"#),
            Frame::Malformed(_)
        ));
    }

    #[test]
    fn test_line_buffer_handles_split_chunks() {
        let mut buffer = LineBuffer::new();

        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert_eq!(buffer.push(b":1}\n\ndata: [DO"), vec!["data: {\"a\":1}", ""]);
        assert_eq!(buffer.push(b"NE]\n"), vec!["data: [DONE]"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_keeps_split_characters_intact() {
        let mut buffer = LineBuffer::new();
        let bytes = "héllo\n".as_bytes();

        // Split inside the two-byte 'é'
        assert!(buffer.push(&bytes[..2]).is_empty());
        assert_eq!(buffer.push(&bytes[2..]), vec!["héllo"]);
    }

    #[test]
    fn test_line_buffer_tail_is_not_rescanned() {
        let mut buffer = LineBuffer::new();

        assert!(buffer.push(b"data: a").is_empty());
        assert!(buffer.push(b"bc").is_empty());
        assert_eq!(buffer.pending_len(), 9);
        assert_eq!(buffer.push(b"\nx\ny"), vec!["data: abc", "x"]);
        assert_eq!(buffer.pending_len(), 1);
        assert_eq!(buffer.push(b"z\n"), vec!["yz"]);
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_line_buffer_finish_returns_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"data: [DONE]");
        assert_eq!(buffer.finish(), Some("data: [DONE]".to_string()));
        assert_eq!(buffer.finish(), None);
    }
}
