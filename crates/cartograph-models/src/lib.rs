//! Core data models for Cartograph.
//!
//! This crate provides the fundamental data types shared by the stream
//! decoder, the recovery engine, the reconciler and the reveal scheduler:
//! graphs, ground-truth file records, stream events and reports.

pub mod event;
pub mod file;
pub mod generation;
pub mod graph;
pub mod report;

// Re-export main types
pub use event::{EventKind, EventRecord};
pub use file::{FileRecord, Hotspot, ScanMetadata};
pub use generation::Generation;
pub use graph::{
    clamp_complexity, clamp_strength, default_strength, Graph, GraphEdge, GraphNode, NodeDetails,
    NodeKind,
};
pub use report::{
    ArchitectureSummary, MemoryProfile, OnboardingGuide, OnboardingStep, Optimization,
    PerformanceFinding, PerformanceReport, ReportKind, SecurityReport, Vulnerability,
};
