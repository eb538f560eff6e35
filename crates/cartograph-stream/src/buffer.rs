//! Append-only accumulator for structured-output text.

/// Concatenation of every `content`/`answer` fragment of one request.
///
/// Owned by a single request and dropped with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayloadBuffer {
    text: String,
    fragments: usize,
}

impl RawPayloadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment.
    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    /// The accumulated text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of fragments appended so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consumes the buffer, returning the accumulated text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for RawPayloadBuffer {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_concatenates() {
        let mut buffer = RawPayloadBuffer::new();
        assert!(buffer.is_empty());

        buffer.push("{\"nodes\":");
        buffer.push("[]}");

        assert_eq!(buffer.as_str(), "{\"nodes\":[]}");
        assert_eq!(buffer.fragments(), 2);
        assert_eq!(buffer.into_string(), "{\"nodes\":[]}");
    }
}
