//! Scan runtime for Cartograph.
//!
//! - [`ScanPipeline`] - one request from stream to result, bound to its
//!   generation
//! - [`ScanCoordinator`] - generation tokens and stale-result discarding
//! - [`RevealScheduler`] - the reveal state machine
//! - [`RevealHandle`] - the timer task driving it
//! - [`Cartographer`] - entry point tying them together
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cartograph_client::{AnalysisClient, ScanRequest};
//! use cartograph_core::CartographConfig;
//! use cartograph_models::ReportKind;
//! use cartograph_runtime::{Cartographer, RuntimeConfig};
//! use cartograph_stream::ThoughtLog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CartographConfig::from_env()?;
//!     let client = Arc::new(AnalysisClient::from_config(&config));
//!     let mut cartographer = Cartographer::new(client, RuntimeConfig::from_config(&config));
//!
//!     let mut frames = cartographer.subscribe()?;
//!     let request = ScanRequest::new(ReportKind::Architecture, "~/src/app", &config);
//!     cartographer.scan(request, &mut ThoughtLog::new()).await?;
//!
//!     while frames.changed().await.is_ok() {
//!         if frames.borrow().is_complete() {
//!             break;
//!         }
//!     }
//!     cartographer.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod reveal;
pub mod runtime;
pub mod scheduler;

pub use config::RuntimeConfig;
pub use error::{PipelineError, Result};
pub use generation::{ScanCoordinator, ScanTicket};
pub use pipeline::{ScanOutcome, ScanPipeline};
pub use reveal::{RevealFrame, RevealHandle};
pub use runtime::Cartographer;
pub use scheduler::{RevealScheduler, RevealState, RevealStep};
