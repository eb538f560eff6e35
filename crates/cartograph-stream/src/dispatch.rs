//! Caller-supplied handling of decoded events.

use cartograph_models::{EventKind, EventRecord};
use serde_json::Value;

/// Receives events in the exact order their frames complete on the wire.
///
/// Every method has a no-op default so callers implement only what they
/// display.
pub trait Dispatcher {
    /// Repository summary arrived.
    fn on_metadata(&mut self, _metadata: &Value) {}

    /// Ground-truth file enumeration arrived.
    fn on_file_list(&mut self, _files: &Value) {}

    /// A reasoning fragment arrived.
    fn on_thought(&mut self, _text: &str) {}

    /// A `content` or `answer` fragment arrived. The fragment has already
    /// been appended to the raw payload.
    fn on_content(&mut self, _kind: EventKind, _text: &str) {}

    /// The stream completed normally.
    fn on_done(&mut self) {}

    /// The stream completed abnormally.
    fn on_error(&mut self, _message: &str) {}
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn on_metadata(&mut self, metadata: &Value) {
        (**self).on_metadata(metadata)
    }

    fn on_file_list(&mut self, files: &Value) {
        (**self).on_file_list(files)
    }

    fn on_thought(&mut self, text: &str) {
        (**self).on_thought(text)
    }

    fn on_content(&mut self, kind: EventKind, text: &str) {
        (**self).on_content(kind, text)
    }

    fn on_done(&mut self) {
        (**self).on_done()
    }

    fn on_error(&mut self, message: &str) {
        (**self).on_error(message)
    }
}

/// Dispatcher that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDispatcher;

impl Dispatcher for NullDispatcher {}

/// Append-only log of reasoning fragments, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct ThoughtLog {
    entries: Vec<String>,
}

impl ThoughtLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments in arrival order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Fragments joined into one text.
    pub fn text(&self) -> String {
        self.entries.concat()
    }
}

impl Dispatcher for ThoughtLog {
    fn on_thought(&mut self, text: &str) {
        self.entries.push(text.to_string());
    }
}

/// Routes a record to the matching dispatcher method.
pub fn route<D: Dispatcher + ?Sized>(record: &EventRecord, dispatcher: &mut D) {
    match record.kind {
        EventKind::Metadata => dispatcher.on_metadata(&record.payload),
        EventKind::FileList => dispatcher.on_file_list(&record.payload),
        EventKind::Thought => {
            if let Some(text) = record.as_text() {
                dispatcher.on_thought(text);
            }
        }
        EventKind::Content | EventKind::Answer => {
            if let Some(text) = record.as_text() {
                dispatcher.on_content(record.kind, text);
            }
        }
        EventKind::Done => dispatcher.on_done(),
        EventKind::Error => dispatcher.on_error(&error_message(&record.payload)),
    }
}

/// Renders an `error` payload as a message.
pub fn error_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Null => "unknown upstream error".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_thought_log_keeps_order() {
        let mut log = ThoughtLog::new();
        route(&EventRecord::text(EventKind::Thought, "first "), &mut log);
        route(&EventRecord::text(EventKind::Content, "ignored"), &mut log);
        route(&EventRecord::text(EventKind::Thought, "second"), &mut log);

        assert_eq!(log.entries(), &["first ".to_string(), "second".to_string()]);
        assert_eq!(log.text(), "first second");
    }

    #[test]
    fn test_error_message_rendering() {
        assert_eq!(error_message(&json!("rate limited")), "rate limited");
        assert_eq!(error_message(&Value::Null), "unknown upstream error");
        assert_eq!(error_message(&json!({"code": 429})), "{\"code\":429}");
    }
}
