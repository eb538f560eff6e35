//! Terminal rendering of live scan events and finished reports.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use serde_json::Value;

use cartograph_client::{HealthStatus, Preview};
use cartograph_core::{read_metadata, Reconciliation, Report};
use cartograph_models::{
    OnboardingGuide, PerformanceReport, ScanMetadata, SecurityReport,
};
use cartograph_runtime::RevealFrame;
use cartograph_stream::Dispatcher;

/// Printed when a scan produced nothing to show.
pub const NO_DATA: &str = "no data";

/// Prints thoughts as they stream in and notes scan progress.
#[derive(Debug, Default)]
pub struct LiveOutput {
    in_thought: bool,
    files: usize,
}

impl LiveOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends a run of thought text with a newline.
    pub fn finish_line(&mut self) {
        if self.in_thought {
            println!();
            self.in_thought = false;
        }
    }
}

impl Dispatcher for LiveOutput {
    fn on_metadata(&mut self, metadata: &Value) {
        self.finish_line();
        if let Some(metadata) = read_metadata(metadata) {
            println!("{}", metadata_line(&metadata));
        }
    }

    fn on_file_list(&mut self, files: &Value) {
        self.files = files.as_array().map_or(0, Vec::len);
        self.finish_line();
        println!("{}", format!("{} files sent for analysis", self.files).dim());
    }

    fn on_thought(&mut self, text: &str) {
        print!("{}", text.dim());
        let _ = io::stdout().flush();
        self.in_thought = true;
    }

    fn on_done(&mut self) {
        self.finish_line();
    }

    fn on_error(&mut self, _message: &str) {
        self.finish_line();
    }
}

/// Redraws the single reveal progress line.
pub fn print_progress(frame: &RevealFrame) -> io::Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    write!(stdout, "{}", progress_line(frame))?;
    if frame.is_complete() {
        writeln!(stdout)?;
    }
    stdout.flush()
}

pub fn progress_line(frame: &RevealFrame) -> String {
    format!(
        "Revealing {}/{} nodes, {} links",
        frame.visible.node_count(),
        frame.total_nodes,
        frame.visible.edge_count()
    )
}

fn metadata_line(metadata: &ScanMetadata) -> String {
    let mut line = format!(
        "Scanning {}: {} files, {} lines",
        if metadata.name.is_empty() { "repository" } else { metadata.name.as_str() },
        metadata.total_files,
        metadata.total_lines
    );
    if let Some(language) = metadata.dominant_language() {
        let _ = write!(line, ", mostly {}", language);
    }
    line
}

/// Renders any finished report.
pub fn render_report(report: &Report) -> String {
    if report.is_empty() {
        return NO_DATA.to_string();
    }
    match report {
        Report::Architecture(reconciliation) => render_architecture(reconciliation),
        Report::Answer(text) => text.clone(),
        Report::Security(security) => render_security(security),
        Report::Onboarding(guide) => render_onboarding(guide),
        Report::Performance(performance) => render_performance(performance),
        Report::Raw { kind, value } => format!(
            "{} report (unrecognised shape):\n{}",
            kind,
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        ),
        Report::Empty(_) => NO_DATA.to_string(),
    }
}

/// Node and edge listing with the architecture narrative.
pub fn render_architecture(reconciliation: &Reconciliation) -> String {
    let graph = &reconciliation.graph;
    let mut out = String::new();

    let _ = writeln!(out, "{} nodes, {} links", graph.node_count(), graph.edge_count());
    if reconciliation.synthesized_nodes > 0 {
        let _ = writeln!(
            out,
            "{} nodes added from the file list",
            reconciliation.synthesized_nodes
        );
    }
    if reconciliation.dropped_edges > 0 {
        let _ = writeln!(out, "{} links to unknown files dropped", reconciliation.dropped_edges);
    }

    let _ = writeln!(out, "\nNodes:");
    for node in &graph.nodes {
        let _ = write!(out, "  [{}] {}", node.kind, node.name);
        if !node.language.is_empty() {
            let _ = write!(out, " ({})", node.language);
        }
        out.push('\n');
    }

    if !graph.edges.is_empty() {
        let _ = writeln!(out, "\nLinks:");
        for edge in &graph.edges {
            let _ = writeln!(out, "  {} -> {} ({})", edge.source, edge.target, edge.relationship);
        }
    }

    if let Some(architecture) = &reconciliation.architecture {
        let _ = writeln!(out);
        if !architecture.pattern.is_empty() {
            let _ = writeln!(out, "Pattern: {}", architecture.pattern);
        }
        if !architecture.summary.is_empty() {
            let _ = writeln!(out, "{}", architecture.summary);
        }
        push_list(&mut out, "Strengths", &architecture.strengths);
        push_list(&mut out, "Concerns", &architecture.concerns);
        push_list(&mut out, "Suggestions", &architecture.suggestions);
    }

    out.trim_end().to_string()
}

fn render_security(report: &SecurityReport) -> String {
    let mut out = String::new();
    if let Some(score) = report.security_score {
        let _ = writeln!(out, "Security score: {:.0}/100", score);
    }
    let _ = writeln!(
        out,
        "{} findings ({} critical, {} high)",
        report.vulnerabilities.len(),
        report.count_severity("critical"),
        report.count_severity("high")
    );
    for finding in &report.vulnerabilities {
        let _ = writeln!(
            out,
            "  [{}] {} in {} {}",
            finding.severity.to_uppercase(),
            finding.vulnerability,
            finding.file,
            finding.line_hint
        );
        if !finding.fix.is_empty() {
            let _ = writeln!(out, "      fix: {}", finding.fix);
        }
    }
    if !report.summary.is_empty() {
        let _ = writeln!(out, "\n{}", report.summary);
    }
    push_list(&mut out, "Done well", &report.positive);
    out.trim_end().to_string()
}

fn render_onboarding(guide: &OnboardingGuide) -> String {
    let mut out = String::new();
    if !guide.project_name.is_empty() {
        let _ = writeln!(out, "{}", guide.project_name);
    }
    if !guide.one_liner.is_empty() {
        let _ = writeln!(out, "{}", guide.one_liner);
    }
    if !guide.tech_stack.is_empty() {
        let _ = writeln!(out, "Stack: {}", guide.tech_stack.join(", "));
    }
    for step in guide.ordered_steps() {
        let _ = writeln!(out, "\n{}. {} ({})", step.order, step.title, step.file);
        if !step.description.is_empty() {
            let _ = writeln!(out, "   {}", step.description);
        }
        for thing in &step.key_things {
            let _ = writeln!(out, "   - {}", thing);
        }
    }
    if !guide.first_task.is_empty() {
        let _ = writeln!(out, "\nFirst task: {}", guide.first_task);
    }
    push_list(&mut out, "Gotchas", &guide.gotchas);
    out.trim_end().to_string()
}

fn render_performance(report: &PerformanceReport) -> String {
    let mut out = String::new();
    if !report.gpu_usage_detected {
        let _ = writeln!(out, "No GPU usage detected");
    } else if !report.framework.is_empty() {
        let _ = writeln!(out, "Framework: {}", report.framework);
    }
    if let Some(score) = report.gpu_score {
        let _ = writeln!(out, "GPU score: {:.0}/100", score);
    }
    for finding in &report.findings {
        let _ = writeln!(
            out,
            "  [{}] {}: {} ({})",
            finding.severity.to_uppercase(),
            finding.category,
            finding.issue,
            finding.file
        );
        if !finding.estimated_speedup.is_empty() {
            let _ = writeln!(out, "      speedup: {}", finding.estimated_speedup);
        }
    }
    for optimization in &report.optimizations {
        let _ = writeln!(
            out,
            "  * {} (effort {}, impact {})",
            optimization.title, optimization.effort, optimization.impact
        );
    }
    if !report.summary.is_empty() {
        let _ = writeln!(out, "\n{}", report.summary);
    }
    out.trim_end().to_string()
}

/// Repository summary and file table for `preview`.
pub fn render_preview(preview: &Preview) -> String {
    let mut out = metadata_line(&preview.summary);
    out.push('\n');
    for file in &preview.files {
        let _ = writeln!(
            out,
            "  {:<48} {:<12} {:>6} lines  complexity {:.0}",
            file.relative_path, file.language, file.line_count, file.complexity_score
        );
    }
    if !preview.summary.hotspots.is_empty() {
        let _ = writeln!(out, "\nHotspots:");
        for hotspot in &preview.summary.hotspots {
            let _ = writeln!(out, "  {} ({:.0})", hotspot.file, hotspot.complexity);
        }
    }
    out.trim_end().to_string()
}

pub fn render_health(health: &HealthStatus) -> String {
    let mut out = format!(
        "Service: {}",
        if health.is_online() { "online" } else { health.status.as_str() }
    );
    if !health.engine.is_empty() {
        let _ = write!(out, "\nEngine:  {}", health.engine);
    }
    if !health.version.is_empty() {
        let _ = write!(out, "\nVersion: {}", health.version);
    }
    let _ = write!(
        out,
        "\nAPI key: {}",
        if health.has_api_key { "configured" } else { "missing" }
    );
    out
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", title);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}
