//! Per-request scan pipeline.
//!
//! A pipeline owns one scan from request to result: it opens the stream,
//! decodes it while dispatching live events, then runs recovery and
//! reconciliation exactly once. It carries its own generation ticket and
//! stops consuming the stream as soon as a newer scan begins.

use std::sync::Arc;

use tracing::{debug, info, warn};

use cartograph_client::{ScanRequest, ScanSource};
use cartograph_core::{interpret, read_file_list, read_metadata, Reconciler, Report};
use cartograph_models::{FileRecord, Generation, Graph, ScanMetadata};
use cartograph_recovery::RecoveryStage;
use cartograph_stream::{decode_stream, Completion, Dispatcher};

use crate::error::{PipelineError, Result};
use crate::generation::ScanTicket;

/// Everything one finished scan produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub generation: Generation,
    pub report: Report,
    /// Recovery stage that produced the structured object, if any.
    pub stage: Option<RecoveryStage>,
    /// Repository summary sent ahead of the stream.
    pub metadata: Option<ScanMetadata>,
    /// Ground-truth file list sent ahead of the stream.
    pub files: Vec<FileRecord>,
    /// Frames decoded from the stream.
    pub frames: usize,
    /// Whether the stream ended with an explicit `done`.
    pub completed: bool,
}

impl ScanOutcome {
    /// The reconciled graph, for architecture scans.
    pub fn graph(&self) -> Option<Arc<Graph>> {
        self.report
            .reconciliation()
            .map(|reconciliation| Arc::new(reconciliation.graph.clone()))
    }

    /// Returns true when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.report.is_empty()
    }
}

/// One scan, bound to its generation.
#[derive(Debug)]
pub struct ScanPipeline {
    ticket: ScanTicket,
    request: ScanRequest,
    reconciler: Reconciler,
}

impl ScanPipeline {
    pub fn new(ticket: ScanTicket, request: ScanRequest, reconciler: Reconciler) -> Self {
        Self {
            ticket,
            request,
            reconciler,
        }
    }

    pub fn generation(&self) -> Generation {
        self.ticket.generation()
    }

    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    fn superseded(&self) -> PipelineError {
        debug!(generation = %self.generation(), "scan superseded");
        PipelineError::Superseded(self.generation())
    }

    /// Runs the scan to completion.
    ///
    /// Returns [`PipelineError::Superseded`] if a newer scan begins at any
    /// point; the stream is dropped at once and nothing is produced.
    pub async fn run<S, D>(mut self, source: &S, dispatcher: &mut D) -> Result<ScanOutcome>
    where
        S: ScanSource + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let generation = self.generation();
        info!(generation = %generation, kind = %self.request.kind, "scan pipeline started");

        let stream = tokio::select! {
            biased;
            _ = self.ticket.superseded() => return Err(self.superseded()),
            opened = source.open(&self.request) => opened?,
        };

        let outcome = tokio::select! {
            biased;
            _ = self.ticket.superseded() => return Err(self.superseded()),
            decoded = decode_stream(stream, dispatcher) => decoded?,
        };

        if let Completion::Failed(message) = &outcome.completion {
            warn!(generation = %generation, error = %message, "upstream reported an error");
            return Err(PipelineError::Upstream(message.clone()));
        }
        if !self.ticket.is_current() {
            return Err(self.superseded());
        }

        let files = outcome
            .file_list
            .as_ref()
            .map(read_file_list)
            .unwrap_or_default();
        let metadata = outcome.metadata.as_ref().and_then(read_metadata);

        let interpretation = interpret(
            self.request.kind,
            outcome.payload.as_str(),
            &files,
            &self.reconciler,
        );

        if !self.ticket.is_current() {
            return Err(self.superseded());
        }

        info!(
            generation = %generation,
            frames = outcome.frames,
            stage = ?interpretation.stage,
            empty = interpretation.report.is_empty(),
            "scan pipeline finished"
        );

        Ok(ScanOutcome {
            generation,
            report: interpretation.report,
            stage: interpretation.stage,
            metadata,
            files,
            frames: outcome.frames,
            completed: outcome.completion == Completion::Done,
        })
    }
}
