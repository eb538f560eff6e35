//! Turns a finished payload buffer into the report its request asked for.

use serde_json::Value;
use tracing::{debug, warn};

use cartograph_models::{
    FileRecord, OnboardingGuide, PerformanceReport, ReportKind, SecurityReport,
};
use cartograph_recovery::{recover, RecoveryError, RecoveryStage};

use crate::interpret::read_lenient;
use crate::reconcile::{Reconciler, Reconciliation};

/// The result of one scan, by report kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Reconciled graph and its architecture narrative.
    Architecture(Reconciliation),
    /// Free-text answer.
    Answer(String),
    Security(SecurityReport),
    Onboarding(OnboardingGuide),
    Performance(PerformanceReport),
    /// A structured object that did not fit its typed report.
    Raw { kind: ReportKind, value: Value },
    /// No usable structured object.
    Empty(ReportKind),
}

impl Report {
    /// Report kind this result answers.
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Architecture(_) => ReportKind::Architecture,
            Report::Answer(_) => ReportKind::Query,
            Report::Security(_) => ReportKind::Security,
            Report::Onboarding(_) => ReportKind::Onboarding,
            Report::Performance(_) => ReportKind::Performance,
            Report::Raw { kind, .. } | Report::Empty(kind) => *kind,
        }
    }

    /// Returns true when there is nothing to display.
    pub fn is_empty(&self) -> bool {
        match self {
            Report::Architecture(reconciliation) => reconciliation.is_empty(),
            Report::Answer(text) => text.trim().is_empty(),
            Report::Empty(_) => true,
            _ => false,
        }
    }

    /// The reconciled graph, for architecture reports.
    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        match self {
            Report::Architecture(reconciliation) => Some(reconciliation),
            _ => None,
        }
    }
}

/// A report together with how its structured object was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub report: Report,
    /// Recovery stage that produced the object; `None` when recovery did
    /// not run or found nothing.
    pub stage: Option<RecoveryStage>,
}

/// Runs recovery once over `payload`, then reconciliation or typed
/// interpretation depending on `kind`.
pub fn interpret(
    kind: ReportKind,
    payload: &str,
    files: &[FileRecord],
    reconciler: &Reconciler,
) -> Interpretation {
    if !kind.is_structured() {
        return Interpretation {
            report: Report::Answer(payload.trim().to_string()),
            stage: None,
        };
    }

    let (value, stage) = match recover(payload) {
        Ok(recovered) => (Some(recovered.value), Some(recovered.stage)),
        Err(RecoveryError::NoStructuredContent) => {
            debug!(kind = %kind, "payload holds no structured content");
            (None, None)
        }
        Err(e) => {
            warn!(kind = %kind, error = %e, "structured payload could not be recovered");
            (None, None)
        }
    };

    let report = match kind {
        ReportKind::Architecture => Report::Architecture(reconciler.reconcile(value.as_ref(), files)),
        _ => match value {
            Some(value) => typed_report(kind, value),
            None => Report::Empty(kind),
        },
    };

    Interpretation { report, stage }
}

fn typed_report(kind: ReportKind, value: Value) -> Report {
    let typed = match kind {
        ReportKind::Security => read_lenient(&value).map(Report::Security),
        ReportKind::Onboarding => read_lenient(&value).map(Report::Onboarding),
        ReportKind::Performance => read_lenient(&value).map(Report::Performance),
        _ => None,
    };
    typed.unwrap_or(Report::Raw { kind, value })
}
