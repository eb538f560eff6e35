//! Main runtime facade.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use cartograph_client::{ScanRequest, ScanSource};
use cartograph_core::Reconciler;
use cartograph_models::Generation;
use cartograph_stream::Dispatcher;

use crate::config::RuntimeConfig;
use crate::error::{PipelineError, Result};
use crate::generation::ScanCoordinator;
use crate::pipeline::{ScanOutcome, ScanPipeline};
use crate::reveal::{RevealFrame, RevealHandle};

/// Runs scans against a source and reveals their graphs.
///
/// Scans may overlap: starting one supersedes every scan still in flight,
/// and only the newest scan's graph is ever presented.
pub struct Cartographer {
    source: Arc<dyn ScanSource>,
    config: RuntimeConfig,
    coordinator: ScanCoordinator,
    reveal: Option<RevealHandle>,
}

impl Cartographer {
    /// Creates the runtime and spawns its reveal task. Must be called
    /// within a tokio runtime.
    pub fn new(source: Arc<dyn ScanSource>, config: RuntimeConfig) -> Self {
        let reveal = RevealHandle::spawn(config.reveal_interval);
        info!(
            reveal_interval_ms = config.reveal_interval.as_millis() as u64,
            fallback_ratio = config.fallback_ratio,
            "cartographer started"
        );
        Self {
            source,
            config,
            coordinator: ScanCoordinator::new(),
            reveal: Some(reveal),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Begins a scan, superseding any scan in flight.
    pub fn begin(&self, request: ScanRequest) -> ScanPipeline {
        let reconciler = Reconciler::new().with_fallback_ratio(self.config.fallback_ratio);
        ScanPipeline::new(self.coordinator.begin(), request, reconciler)
    }

    /// Runs a scan and, for architecture scans, presents its graph.
    ///
    /// On any error the graph currently on display is left untouched.
    pub async fn scan<D>(&self, request: ScanRequest, dispatcher: &mut D) -> Result<ScanOutcome>
    where
        D: Dispatcher + ?Sized,
    {
        let reveal = self.reveal.as_ref().ok_or(PipelineError::Shutdown)?;
        let outcome = self.begin(request).run(&*self.source, dispatcher).await?;

        if let Some(graph) = outcome.graph() {
            let generation = outcome.generation;
            self.coordinator
                .publish_if_current(generation, || reveal.present(generation, graph))
                .ok_or(PipelineError::Superseded(generation))??;
            debug!(generation = %generation, "graph presented");
        }

        Ok(outcome)
    }

    /// Abandons every scan in flight.
    pub fn cancel(&self) {
        self.coordinator.cancel_all();
    }

    /// Generation of the most recent scan.
    pub fn current_generation(&self) -> Generation {
        self.coordinator.current()
    }

    /// Subscribes to reveal frames.
    pub fn subscribe(&self) -> Result<watch::Receiver<RevealFrame>> {
        self.reveal
            .as_ref()
            .map(RevealHandle::subscribe)
            .ok_or(PipelineError::Shutdown)
    }

    /// Cancels in-flight scans and stops the reveal task.
    pub async fn shutdown(&mut self) -> Result<()> {
        let reveal = self.reveal.take().ok_or(PipelineError::Shutdown)?;
        info!("shutting down cartographer");
        self.coordinator.cancel_all();
        reveal.shutdown().await?;
        info!("cartographer stopped");
        Ok(())
    }

    /// Returns true until [`Cartographer::shutdown`] has run.
    pub fn is_running(&self) -> bool {
        self.reveal.is_some()
    }
}

impl Drop for Cartographer {
    fn drop(&mut self) {
        if self.reveal.is_some() {
            self.coordinator.cancel_all();
        }
    }
}
