//! Export of a finished graph as a JSON document or a Mermaid diagram.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use cartograph_models::{ArchitectureSummary, Graph, GraphEdge, GraphNode, ScanMetadata};

use crate::error::Result;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Mermaid,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Mermaid => "mmd",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "mermaid" | "mmd" => Ok(ExportFormat::Mermaid),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// The complete graph plus narrative, with stable field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
    pub architecture: Option<ArchitectureSummary>,
    pub metadata: Option<ScanMetadata>,
    pub generated_at: DateTime<Utc>,
}

impl ExportDocument {
    /// Builds a document stamped with the current time.
    pub fn new(
        graph: &Graph,
        architecture: Option<ArchitectureSummary>,
        metadata: Option<ScanMetadata>,
    ) -> Self {
        Self {
            nodes: graph.nodes.clone(),
            links: graph.edges.clone(),
            architecture,
            metadata,
            generated_at: Utc::now(),
        }
    }

    /// The graph carried by this document.
    pub fn graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.links.clone())
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders in the requested format.
    pub fn render(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Mermaid => Ok(to_mermaid(&self.graph())),
        }
    }
}

/// Escapes text for use inside a quoted Mermaid label.
fn mermaid_label(text: &str) -> String {
    text.replace('"', "#quot;")
}

/// Renders a `graph TD` flowchart, one line per node then one per edge.
pub fn to_mermaid(graph: &Graph) -> String {
    let mut out = String::from("graph TD\n");
    let mut ids: HashMap<&str, usize> = HashMap::new();

    for (i, node) in graph.nodes.iter().enumerate() {
        ids.insert(node.id.as_str(), i);
        let _ = writeln!(out, "    N{}[\"{}\"]", i, mermaid_label(&node.name));
    }

    for edge in &graph.edges {
        let (Some(s), Some(t)) = (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
        else {
            continue;
        };
        let relationship = edge.relationship.replace('|', "/");
        if relationship.trim().is_empty() {
            let _ = writeln!(out, "    N{} --> N{}", s, t);
        } else {
            let _ = writeln!(out, "    N{} -->|{}| N{}", s, mermaid_label(&relationship), t);
        }
    }

    out
}

/// File name for an export of `name` taken at `at`.
pub fn export_file_name(name: &str, format: ExportFormat, at: DateTime<Utc>) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "graph".to_string() } else { stem };
    format!("{}-{}.{}", stem, at.format("%Y%m%d-%H%M%S"), format.extension())
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_export(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    info!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(path.to_path_buf())
}
