//! Line-oriented frame decoder.
//!
//! Chunks arrive with arbitrary boundaries: one logical frame may span
//! several chunks and one chunk may carry several frames. The decoder keeps
//! only the unterminated tail between calls.

use cartograph_models::{EventKind, EventRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// Prefix marking a data line.
pub const DATA_PREFIX: &str = "data:";

/// Wire shape of one frame.
#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Value,
}

/// Incremental decoder holding the pending, unterminated line.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    /// Prefix of `pending` already searched for a terminator.
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every record completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<EventRecord> {
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut line_start = 0;
        let mut cursor = self.scanned;

        while let Some(offset) = self.pending[cursor..].iter().position(|b| *b == b'\n') {
            let line_end = cursor + offset;
            if let Some(record) = decode_line(&self.pending[line_start..line_end]) {
                records.push(record);
            }
            line_start = line_end + 1;
            cursor = line_start;
        }

        self.pending.drain(..line_start);
        self.scanned = self.pending.len();
        records
    }

    /// Decodes whatever unterminated fragment remains at end of stream.
    pub fn finish(&mut self) -> Option<EventRecord> {
        let tail = std::mem::take(&mut self.pending);
        self.scanned = 0;
        decode_line(&tail)
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Decodes one line, returning `None` for anything that is not a
/// well-formed data frame of a known type.
pub fn decode_line(line: &[u8]) -> Option<EventRecord> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let line = match std::str::from_utf8(line) {
        Ok(line) => line,
        Err(e) => {
            trace!(error = %e, "dropping non-utf8 line");
            return None;
        }
    };

    let body = line.strip_prefix(DATA_PREFIX)?;
    let body = body.strip_prefix(' ').unwrap_or(body);

    let frame: WireFrame = match serde_json::from_str(body) {
        Ok(frame) => frame,
        Err(e) => {
            trace!(error = %e, "dropping undecodable frame");
            return None;
        }
    };

    match EventKind::parse(&frame.kind) {
        Some(kind) => Some(EventRecord::new(kind, frame.content)),
        None => {
            trace!(kind = %frame.kind, "dropping frame of unknown type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_line_variants() {
        let record = decode_line(br#"data: {"type":"thought","content":"hmm"}"#).unwrap();
        assert_eq!(record.kind, EventKind::Thought);
        assert_eq!(record.as_text(), Some("hmm"));

        let record = decode_line(b"data:{\"type\":\"done\"}\r").unwrap();
        assert_eq!(record.kind, EventKind::Done);
        assert_eq!(record.payload, Value::Null);

        assert!(decode_line(b": keepalive").is_none());
        assert!(decode_line(b"").is_none());
        assert!(decode_line(b"event: message").is_none());
        assert!(decode_line(b"data: {not json").is_none());
        assert!(decode_line(br#"data: {"type":"bogus","content":1}"#).is_none());
        assert!(decode_line(b"data: \xff\xfe").is_none());
    }

    #[test]
    fn test_push_splits_mid_line() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.push(br#"data: {"type":"con"#).is_empty());
        assert!(decoder.pending_len() > 0);

        let records = decoder.push(b"tent\",\"content\":\"{\\\"a\\\":1}\"}\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, EventKind::Content);
        assert_eq!(records[0].as_text(), Some("{\"a\":1}"));
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_push_multiple_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let chunk = concat!(
            "data: {\"type\":\"metadata\",\"content\":{\"total_files\":2}}\n\n",
            ": ping\n",
            "data: {\"type\":\"thought\",\"content\":\"a\"}\n",
            "data: {\"type\":\"thou"
        );

        let records = decoder.push(chunk.as_bytes());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, json!({"total_files": 2}));
        assert_eq!(records[1].as_text(), Some("a"));
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let line = "data: {\"type\":\"thought\",\"content\":\"caf\u{e9} \u{2192} ok\"}\n";
        let bytes = line.as_bytes();
        let split = line.find('\u{e9}').unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let records = decoder.push(&bytes[split..]);

        assert_eq!(records[0].as_text(), Some("caf\u{e9} \u{2192} ok"));
    }

    #[test]
    fn test_finish_flushes_unterminated_tail() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(br#"data: {"type":"done"}"#).is_empty());

        let record = decoder.finish().unwrap();
        assert_eq!(record.kind, EventKind::Done);
        assert!(decoder.finish().is_none());
    }
}
