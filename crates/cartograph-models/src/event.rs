//! Typed records decoded from the model event stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a streamed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Repository summary from the scanner.
    Metadata,
    /// Ground-truth file enumeration.
    FileList,
    /// Model reasoning, shown live and never parsed.
    Thought,
    /// Structured-output text for analysis requests.
    Content,
    /// Answer text for question requests.
    Answer,
    /// Normal completion.
    Done,
    /// Abnormal completion with a message.
    Error,
}

impl EventKind {
    /// Parses a wire `type` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "metadata" => Some(EventKind::Metadata),
            "file_list" => Some(EventKind::FileList),
            "thought" => Some(EventKind::Thought),
            "content" => Some(EventKind::Content),
            "answer" => Some(EventKind::Answer),
            "done" => Some(EventKind::Done),
            "error" => Some(EventKind::Error),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Metadata => "metadata",
            EventKind::FileList => "file_list",
            EventKind::Thought => "thought",
            EventKind::Content => "content",
            EventKind::Answer => "answer",
            EventKind::Done => "done",
            EventKind::Error => "error",
        }
    }

    /// Returns true for kinds whose text accumulates into the raw payload.
    pub fn is_payload(&self) -> bool {
        matches!(self, EventKind::Content | EventKind::Answer)
    }

    /// Returns true for kinds that end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Done | EventKind::Error)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded frame. Consumed immediately by a dispatcher, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub kind: EventKind,
    pub payload: Value,
}

impl EventRecord {
    /// Creates a record.
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// Creates a record carrying a text payload.
    pub fn text(kind: EventKind, text: impl Into<String>) -> Self {
        Self::new(kind, Value::String(text.into()))
    }

    /// Returns the payload as text, if it is a string.
    pub fn as_text(&self) -> Option<&str> {
        self.payload.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in [
            EventKind::Metadata,
            EventKind::FileList,
            EventKind::Thought,
            EventKind::Content,
            EventKind::Answer,
            EventKind::Done,
            EventKind::Error,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("keepalive"), None);
    }

    #[test]
    fn test_kind_classification() {
        assert!(EventKind::Content.is_payload());
        assert!(EventKind::Answer.is_payload());
        assert!(!EventKind::Thought.is_payload());
        assert!(EventKind::Done.is_terminal());
        assert!(EventKind::Error.is_terminal());
        assert!(!EventKind::Metadata.is_terminal());
    }

    #[test]
    fn test_record_text() {
        let record = EventRecord::text(EventKind::Thought, "thinking");
        assert_eq!(record.as_text(), Some("thinking"));

        let record = EventRecord::new(EventKind::Done, Value::Null);
        assert_eq!(record.as_text(), None);
    }
}
