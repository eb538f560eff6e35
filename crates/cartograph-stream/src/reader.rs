//! Async driver feeding a chunk stream through the frame decoder.

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, trace};

use cartograph_models::{EventKind, EventRecord};

use crate::buffer::RawPayloadBuffer;
use crate::decoder::FrameDecoder;
use crate::dispatch::{error_message, route, Dispatcher};
use crate::error::{Result, StreamError};

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A `done` frame arrived.
    Done,
    /// An `error` frame arrived with this message.
    Failed(String),
    /// The transport closed without a terminal frame.
    EndOfStream,
}

impl Completion {
    /// Returns true unless the upstream reported an error.
    pub fn is_success(&self) -> bool {
        !matches!(self, Completion::Failed(_))
    }
}

/// Everything a finished stream hands back to its caller.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    /// Concatenated `content`/`answer` text.
    pub payload: RawPayloadBuffer,
    /// Last `metadata` payload seen.
    pub metadata: Option<Value>,
    /// Last `file_list` payload seen.
    pub file_list: Option<Value>,
    pub completion: Completion,
    /// Number of frames decoded.
    pub frames: usize,
}

#[derive(Debug, Default)]
struct Collector {
    payload: RawPayloadBuffer,
    metadata: Option<Value>,
    file_list: Option<Value>,
    frames: usize,
}

impl Collector {
    /// Records and forwards one event; returns the completion if terminal.
    fn accept<D: Dispatcher + ?Sized>(
        &mut self,
        record: EventRecord,
        dispatcher: &mut D,
    ) -> Option<Completion> {
        self.frames += 1;
        trace!(kind = %record.kind, "frame decoded");

        if record.kind.is_payload() {
            if let Some(text) = record.as_text() {
                self.payload.push(text);
            }
        }

        route(&record, dispatcher);

        match record.kind {
            EventKind::Metadata => {
                self.metadata = Some(record.payload);
                None
            }
            EventKind::FileList => {
                self.file_list = Some(record.payload);
                None
            }
            EventKind::Done => Some(Completion::Done),
            EventKind::Error => Some(Completion::Failed(error_message(&record.payload))),
            _ => None,
        }
    }

    fn finish(self, completion: Completion) -> StreamOutcome {
        debug!(
            frames = self.frames,
            payload_bytes = self.payload.len(),
            completion = ?completion,
            "stream finished"
        );
        StreamOutcome {
            payload: self.payload,
            metadata: self.metadata,
            file_list: self.file_list,
            completion,
            frames: self.frames,
        }
    }
}

/// Decodes a chunk stream, dispatching each event as its frame completes.
///
/// Stops at the first terminal frame or at end of stream. A read error
/// aborts immediately with [`StreamError::Transport`].
pub async fn decode_stream<S, B, E, D>(stream: S, dispatcher: &mut D) -> Result<StreamOutcome>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    D: Dispatcher + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = FrameDecoder::new();
    let mut collector = Collector::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StreamError::Transport(e.to_string()))?;

        for record in decoder.push(chunk.as_ref()) {
            if let Some(completion) = collector.accept(record, dispatcher) {
                return Ok(collector.finish(completion));
            }
        }
    }

    if let Some(record) = decoder.finish() {
        if let Some(completion) = collector.accept(record, dispatcher) {
            return Ok(collector.finish(completion));
        }
    }

    Ok(collector.finish(Completion::EndOfStream))
}

/// Decodes a fully buffered body in one pass.
pub fn decode_all<D: Dispatcher + ?Sized>(body: &[u8], dispatcher: &mut D) -> StreamOutcome {
    let mut decoder = FrameDecoder::new();
    let mut collector = Collector::default();

    let records = decoder.push(body).into_iter().chain(decoder.finish());
    for record in records {
        if let Some(completion) = collector.accept(record, dispatcher) {
            return collector.finish(completion);
        }
    }

    collector.finish(Completion::EndOfStream)
}
