//! Client for the Cartograph analysis service.
//!
//! [`AnalysisClient`] opens scan event streams and fetches preview and
//! health information. Anything that can produce a scan's raw chunks
//! implements [`ScanSource`], which is what the pipeline consumes.

pub mod client;
pub mod error;
pub mod request;
pub mod source;

pub use client::{AnalysisClient, HEALTH_PATH, PREVIEW_PATH};
pub use error::{ClientError, Result};
pub use request::{HealthStatus, Preview, RequestBody, ScanRequest};
pub use source::{ChunkStream, ReplaySource, ScanSource};
