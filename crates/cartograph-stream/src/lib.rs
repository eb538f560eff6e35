//! Event frame decoding for Cartograph model streams.
//!
//! The analysis service answers with a long-lived chunked text stream of
//! `data: {"type": ..., "content": ...}` lines. This crate turns that
//! stream into ordered [`EventRecord`](cartograph_models::EventRecord)s:
//!
//! - [`FrameDecoder`] - synchronous, boundary-agnostic line reassembly
//! - [`decode_stream`] - async driver over any chunk stream
//! - [`Dispatcher`] - caller-supplied live handling of each event
//! - [`RawPayloadBuffer`] - accumulated structured-output text
//!
//! # Example
//!
//! ```
//! use cartograph_stream::{decode_all, ThoughtLog};
//!
//! let body = b"data: {\"type\":\"thought\",\"content\":\"reading files\"}\n\n\
//!              data: {\"type\":\"content\",\"content\":\"{}\"}\n\n\
//!              data: {\"type\":\"done\"}\n\n";
//!
//! let mut log = ThoughtLog::new();
//! let outcome = decode_all(body, &mut log);
//!
//! assert_eq!(outcome.payload.as_str(), "{}");
//! assert_eq!(log.text(), "reading files");
//! ```

pub mod buffer;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod reader;

pub use buffer::RawPayloadBuffer;
pub use decoder::{decode_line, FrameDecoder, DATA_PREFIX};
pub use dispatch::{route, Dispatcher, NullDispatcher, ThoughtLog};
pub use error::{Result, StreamError};
pub use reader::{decode_all, decode_stream, Completion, StreamOutcome};
