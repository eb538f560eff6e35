//! Merges recovered graph objects with ground-truth file records.
//!
//! The model routinely describes only a handful of the files it was shown,
//! or nothing at all. The reconciler guarantees a complete graph by
//! synthesizing placeholder nodes from the scanner's file list, and
//! guarantees a consistent one by dropping every edge whose endpoints are
//! not both present.

use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};

use cartograph_models::{
    clamp_complexity, ArchitectureSummary, FileRecord, Graph, GraphNode, NodeDetails, NodeKind,
};

use crate::interpret::{read_architecture, read_edges, read_nodes};

/// Fraction of the file count below which placeholder nodes are added.
pub const DEFAULT_FALLBACK_RATIO: f64 = 0.4;

/// Filenames treated as application entry points.
static ENTRY_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:main|app|index|server)\.").expect("Invalid entry point regex")
});

/// Extensions classified as source code.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".c", ".cpp", ".h", ".hpp", ".rs", ".go", ".java",
    ".kt", ".swift", ".rb", ".php", ".cs", ".cu", ".cuh", ".sh", ".bat", ".sql", ".proto",
    ".zig", ".lua", ".scala", ".r", ".dart", ".ex", ".exs", ".vue", ".svelte",
];

/// Classifies a file that the model did not describe.
pub fn classify(file: &FileRecord) -> NodeKind {
    if ENTRY_POINT.is_match(file.file_name()) {
        NodeKind::Entry
    } else if SOURCE_EXTENSIONS.contains(&file.effective_extension().as_str()) {
        NodeKind::Core
    } else {
        NodeKind::Peripheral
    }
}

/// Builds the placeholder node for a file.
pub fn synthesize(file: &FileRecord) -> GraphNode {
    let kind = classify(file);
    let mut node = GraphNode::new(file.relative_path.clone(), file.file_name(), kind)
        .with_language(file.language.clone());
    node.group = file.parent_dir().map(str::to_string);
    node.complexity_score = clamp_complexity(file.complexity_score);
    node.imports = file.imports.clone();
    node.details = NodeDetails::default();
    node
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Final graph; consistent by construction.
    pub graph: Graph,
    /// Architecture narrative from the recovered object, if any.
    pub architecture: Option<ArchitectureSummary>,
    /// Nodes read from the recovered object.
    pub recovered_nodes: usize,
    /// Placeholder nodes added from the file list.
    pub synthesized_nodes: usize,
    /// Edges dropped for naming a missing node.
    pub dropped_edges: usize,
}

impl Reconciliation {
    /// Returns true when there was nothing to show.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// Graph reconciler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciler {
    fallback_ratio: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            fallback_ratio: DEFAULT_FALLBACK_RATIO,
        }
    }
}

impl Reconciler {
    /// Creates a reconciler with the default fallback ratio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback ratio, clamped to 0..=1.
    pub fn with_fallback_ratio(mut self, ratio: f64) -> Self {
        self.fallback_ratio = if ratio.is_nan() {
            DEFAULT_FALLBACK_RATIO
        } else {
            ratio.clamp(0.0, 1.0)
        };
        self
    }

    /// Current fallback ratio.
    pub fn fallback_ratio(&self) -> f64 {
        self.fallback_ratio
    }

    /// Returns true if `recovered` nodes are too few for `files` files.
    pub fn needs_fallback(&self, recovered: usize, files: usize) -> bool {
        (recovered as f64) < self.fallback_ratio * files as f64
    }

    /// Reconciles a recovered object (or none) against the file list.
    pub fn reconcile(&self, recovered: Option<&Value>, files: &[FileRecord]) -> Reconciliation {
        let (nodes, edges, architecture) = match recovered {
            Some(object) => (
                read_nodes(object),
                read_edges(object),
                read_architecture(object),
            ),
            None => (Vec::new(), Vec::new(), None),
        };

        let mut graph = Graph::new(nodes, Vec::new());
        let recovered_nodes = graph.node_count();

        let mut synthesized_nodes = 0;
        if self.needs_fallback(recovered_nodes, files.len()) {
            let placeholders = self.missing_files(&graph, files);
            synthesized_nodes = placeholders.len();
            info!(
                recovered = recovered_nodes,
                files = files.len(),
                synthesized = synthesized_nodes,
                "adding placeholder nodes from file list"
            );
            graph.nodes.extend(placeholders);
        }

        let total_edges = edges.len();
        graph.edges = edges;
        let dropped_edges = graph.drop_dangling_edges();
        if dropped_edges > 0 {
            debug!(dropped = dropped_edges, total = total_edges, "dropped dangling edges");
        }

        if graph.is_empty() {
            debug!("reconciliation produced an empty graph");
        }

        Reconciliation {
            graph,
            architecture,
            recovered_nodes,
            synthesized_nodes,
            dropped_edges,
        }
    }

    /// Placeholder nodes for files not represented in `graph`, matched by
    /// full relative path or bare filename against node ids and names.
    fn missing_files(&self, graph: &Graph, files: &[FileRecord]) -> Vec<GraphNode> {
        let mut known: HashSet<&str> = HashSet::new();
        for node in &graph.nodes {
            known.insert(node.id.as_str());
            known.insert(node.name.as_str());
        }

        let mut placeholders: Vec<GraphNode> = Vec::new();
        let mut added: HashSet<&str> = HashSet::new();
        for file in files {
            let represented = known.contains(file.relative_path.as_str())
                || known.contains(file.file_name());
            if represented || !added.insert(file.relative_path.as_str()) {
                continue;
            }
            placeholders.push(synthesize(file));
        }
        placeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn files() -> Vec<FileRecord> {
        vec![
            FileRecord::new("src/main.py", "Python").with_complexity(42.0),
            FileRecord::new("src/utils/helpers.py", "Python")
                .with_imports(vec!["os".to_string()]),
            FileRecord::new("Server.JS", "JavaScript"),
            FileRecord::new("config/settings.yaml", "YAML"),
            FileRecord::new("README.md", "Markdown"),
        ]
    }

    #[test]
    fn test_classify() {
        let kinds: Vec<NodeKind> = files().iter().map(classify).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Entry,
                NodeKind::Core,
                NodeKind::Entry,
                NodeKind::Peripheral,
                NodeKind::Peripheral,
            ]
        );
        assert_eq!(classify(&FileRecord::new("domain.py", "Python")), NodeKind::Core);
        assert_eq!(classify(&FileRecord::new("mainframe.py", "Python")), NodeKind::Core);
    }

    #[test]
    fn test_synthesize_presentation() {
        let node = synthesize(&files()[0]);

        assert_eq!(node.id, "src/main.py");
        assert_eq!(node.name, "main.py");
        assert_eq!(node.group.as_deref(), Some("src"));
        assert_eq!(node.weight, 15.0);
        assert_eq!(node.color_hint, "#76b900");
        assert_eq!(node.complexity_score, 42.0);
        assert!(node.details.is_empty());

        let node = synthesize(&files()[4]);
        assert_eq!(node.group, None);
        assert_eq!(node.weight, 2.0);
    }

    #[test]
    fn test_nothing_recovered_synthesizes_every_file() {
        let result = Reconciler::new().reconcile(None, &files());

        assert_eq!(result.graph.node_count(), 5);
        assert_eq!(result.synthesized_nodes, 5);
        assert_eq!(result.graph.edge_count(), 0);
        let entries: Vec<&str> = result
            .graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Entry)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(entries, vec!["main.py", "Server.JS"]);
    }

    #[test]
    fn test_sparse_recovery_adds_unmatched_files() {
        let object = json!({
            "nodes": [{"id": "main.py", "type": "star"}],
            "links": [
                {"source": "main.py", "target": "src/utils/helpers.py"},
                {"source": "main.py", "target": "ghost.py"}
            ]
        });
        let result = Reconciler::new().reconcile(Some(&object), &files());

        assert_eq!(result.recovered_nodes, 1);
        assert_eq!(result.synthesized_nodes, 4);
        assert_eq!(result.graph.node_count(), 5);
        assert!(!result.graph.contains_node("src/main.py"));
        assert_eq!(result.graph.edge_count(), 1);
        assert_eq!(result.dropped_edges, 1);
        assert!(result.graph.is_consistent());
    }

    #[test]
    fn test_sufficient_recovery_is_kept_as_is() {
        let object = json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [{"source": "a", "target": "b"}],
            "architecture": {"pattern": "pipeline"}
        });
        let files: Vec<FileRecord> = files().into_iter().take(4).collect();
        let result = Reconciler::new().reconcile(Some(&object), &files);

        assert_eq!(result.synthesized_nodes, 0);
        assert_eq!(result.graph.node_count(), 2);
        assert_eq!(result.graph.edge_count(), 1);
        assert_eq!(result.architecture.unwrap().pattern, "pipeline");
    }

    #[test]
    fn test_empty_file_list_passes_through() {
        let object = json!({"nodes": [{"id": "a"}, {"id": "a"}], "edges": [{"source": "a", "target": "z"}]});
        let result = Reconciler::new().reconcile(Some(&object), &[]);

        assert_eq!(result.graph.node_count(), 1);
        assert_eq!(result.graph.edge_count(), 0);
        assert_eq!(result.synthesized_nodes, 0);
    }

    #[test]
    fn test_nothing_at_all_is_empty() {
        let result = Reconciler::new().reconcile(None, &[]);
        assert!(result.is_empty());
        assert_eq!(result.graph, Graph::empty());
    }

    #[test]
    fn test_ratio_is_tunable() {
        let object = json!({"nodes": [{"id": "a"}]});
        let strict = Reconciler::new().with_fallback_ratio(0.1);
        assert_eq!(strict.reconcile(Some(&object), &files()).synthesized_nodes, 0);

        let eager = Reconciler::new().with_fallback_ratio(1.0);
        assert_eq!(eager.reconcile(Some(&object), &files()).synthesized_nodes, 5);
        assert_eq!(Reconciler::new().with_fallback_ratio(f64::NAN).fallback_ratio(), 0.4);
    }
}
