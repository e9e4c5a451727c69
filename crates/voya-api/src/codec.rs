//! Incremental framing of the event stream
//!
//! The backend pushes newline-delimited event lines. Network chunk boundaries
//! are not event boundaries: a chunk may end mid-line or mid-character, so
//! bytes are buffered until a full line is available before decoding.

use crate::error::Result;

/// Prefix carried by every event line the backend pushes
pub const DATA_PREFIX: &str = "data: ";

/// Reassembles complete text lines from raw byte chunks.
///
/// Any trailing partial line is carried over and prepended to the next chunk
/// before re-splitting. Because splitting happens on the `\n` byte (which
/// never occurs inside a multi-byte UTF-8 sequence), characters split across
/// chunks are decoded intact once their line completes.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning every line it completes, in order.
    /// A trailing `\r` is stripped from each line.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut line = &self.buf[start..end];
            if line.ends_with(b"\r") {
                line = &line[..line.len() - 1];
            }
            lines.push(std::str::from_utf8(line)?.to_owned());
            start = end + 1;
        }
        self.buf.drain(..start);

        Ok(lines)
    }

    /// Consume the decoder at stream end, returning any unterminated trailing
    /// text. The caller decides whether it forms a complete event; trailing
    /// bytes that are not valid UTF-8 are discarded as truncated.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        String::from_utf8(self.buf).ok()
    }
}

/// Extract the event payload from a decoded line.
///
/// Returns `None` for blank keep-alive lines and lines without the
/// `data: ` prefix; those are ignored, not errors.
pub fn data_payload(line: &str) -> Option<&str> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    (!payload.is_empty()).then_some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_lines(decoder: &mut FrameDecoder, chunks: &[&[u8]]) -> Vec<String> {
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(decoder.push(chunk).unwrap());
        }
        lines
    }

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut decoder = FrameDecoder::new();
        let lines = decoder.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n").unwrap();
        assert_eq!(lines, vec!["data: {\"a\":1}", "", "data: {\"b\":2}"]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        let lines = collect_lines(&mut decoder, &[b"data: {\"ty", b"pe\":\"x\"}\n"]);
        assert_eq!(lines, vec!["data: {\"type\":\"x\"}"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        // "你好" is 6 bytes; cut inside the second character.
        let bytes = "data: 你好\n".as_bytes();
        let mut decoder = FrameDecoder::new();
        let lines = collect_lines(&mut decoder, &[&bytes[..8], &bytes[8..]]);
        assert_eq!(lines, vec!["data: 你好"]);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        // Splitting at every possible byte boundary must yield the same lines
        // as one chunk.
        let bytes = "data: 第一行\ndata: line two\r\n\ndata: 最后\n".as_bytes();
        let mut reference = FrameDecoder::new();
        let expected = reference.push(bytes).unwrap();

        for split in 0..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let lines = collect_lines(&mut decoder, &[&bytes[..split], &bytes[split..]]);
            assert_eq!(lines, expected, "split at byte {}", split);
        }

        // Degenerate case: one byte per chunk.
        let mut decoder = FrameDecoder::new();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(collect_lines(&mut decoder, &chunks), expected);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut decoder = FrameDecoder::new();
        let lines = decoder.push(b"data: one\r\ndata: two\n").unwrap();
        assert_eq!(lines, vec!["data: one", "data: two"]);
    }

    #[test]
    fn test_invalid_utf8_in_completed_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: \xff\xfe\n").is_err());
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut decoder = FrameDecoder::new();
        let lines = decoder.push(b"data: one\ndata: tail").unwrap();
        assert_eq!(lines, vec!["data: one"]);
        assert_eq!(decoder.finish().as_deref(), Some("data: tail"));
    }

    #[test]
    fn test_finish_empty() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"data: one\n").unwrap();
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_finish_truncated_mid_character() {
        let bytes = "data: 你".as_bytes();
        let mut decoder = FrameDecoder::new();
        // Feed all but the last byte of the multi-byte character.
        decoder.push(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(data_payload(""), None);
        assert_eq!(data_payload("event: ping"), None);
        assert_eq!(data_payload("data: "), None);
        assert_eq!(data_payload("data:{\"a\":1}"), None);
    }
}
