//! Where scan chunks come from.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::client::AnalysisClient;
use crate::error::{ClientError, Result};
use crate::request::ScanRequest;

/// Raw chunks of one scan's event stream.
pub type ChunkStream = BoxStream<'static, std::result::Result<Vec<u8>, ClientError>>;

/// Opens the event stream for a scan request.
#[async_trait]
pub trait ScanSource: Send + Sync {
    async fn open(&self, request: &ScanRequest) -> Result<ChunkStream>;
}

#[async_trait]
impl ScanSource for AnalysisClient {
    async fn open(&self, request: &ScanRequest) -> Result<ChunkStream> {
        self.stream(request).await
    }
}

/// Replays a captured stream body, split into fixed-size chunks.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    body: Vec<u8>,
    chunk_size: usize,
}

impl ReplaySource {
    /// Replays `body` in chunks of at most `chunk_size` bytes.
    pub fn new(body: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        Self {
            body: body.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Reads a captured stream from disk.
    pub fn from_file(path: &std::path::Path, chunk_size: usize) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read(path)?, chunk_size))
    }
}

#[async_trait]
impl ScanSource for ReplaySource {
    async fn open(&self, _request: &ScanRequest) -> Result<ChunkStream> {
        let chunks: Vec<std::result::Result<Vec<u8>, ClientError>> = self
            .body
            .chunks(self.chunk_size)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::CartographConfig;
    use cartograph_models::ReportKind;

    #[tokio::test]
    async fn test_replay_source_chunks() {
        let source = ReplaySource::new(b"abcdefg".to_vec(), 3);
        let request = ScanRequest::new(ReportKind::Architecture, "/tmp/x", &CartographConfig::new());

        let chunks: Vec<Vec<u8>> = source
            .open(&request)
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
    }
}
