//! Graph types: files as nodes, relationships as edges.
//!
//! A [`Graph`] is built once per completed scan and superseded, never
//! mutated, by the next one. Every constructor that can see edges keeps the
//! endpoint invariant: both ends of an edge name a node of the same graph.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Architectural role of a node.
///
/// The model describes roles with an astronomical vocabulary
/// (`star`, `planet`, `moon`, `satellite`); both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry points and main application files.
    #[serde(alias = "star")]
    Entry,
    /// Core business logic.
    #[serde(alias = "planet")]
    Core,
    /// Utilities, helpers, services.
    #[serde(alias = "moon")]
    Utility,
    /// Config, assets, data files.
    #[default]
    #[serde(alias = "satellite")]
    Peripheral,
}

impl NodeKind {
    /// Parses either vocabulary, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" | "star" => Some(NodeKind::Entry),
            "core" | "planet" => Some(NodeKind::Core),
            "utility" | "moon" => Some(NodeKind::Utility),
            "peripheral" | "satellite" => Some(NodeKind::Peripheral),
            _ => None,
        }
    }

    /// Display weight given to nodes of this kind when none is supplied.
    pub fn default_weight(self) -> f64 {
        match self {
            NodeKind::Entry => 15.0,
            NodeKind::Core => 8.0,
            NodeKind::Utility => 5.0,
            NodeKind::Peripheral => 2.0,
        }
    }

    /// Color hint given to nodes of this kind when none is supplied.
    pub fn default_color(self) -> &'static str {
        match self {
            NodeKind::Entry => "#76b900",
            NodeKind::Core => "#3b82f6",
            NodeKind::Utility => "#a78bfa",
            NodeKind::Peripheral => "#94a3b8",
        }
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Entry => "entry",
            NodeKind::Core => "core",
            NodeKind::Utility => "utility",
            NodeKind::Peripheral => "peripheral",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative annotation attached to a node by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    /// What the file does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Design pattern used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_dependencies: Vec<String>,

    /// Code quality observations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_notes: Option<String>,
}

impl NodeDetails {
    /// Returns true if no narrative field is set.
    pub fn is_empty(&self) -> bool {
        self.purpose.is_none()
            && self.pattern.is_none()
            && self.classes.is_empty()
            && self.functions.is_empty()
            && self.key_dependencies.is_empty()
            && self.quality_notes.is_none()
    }
}

/// A file in the graph.
///
/// Identity is `id`; `name` is a display label and may repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier within a graph.
    pub id: String,

    /// Display label.
    pub name: String,

    /// Architectural role.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,

    /// Module group the node belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Language name (e.g., "Python").
    #[serde(default)]
    pub language: String,

    /// Color hint for the rendering layer.
    #[serde(rename = "color", default)]
    pub color_hint: String,

    /// Relative display size.
    #[serde(rename = "val", default)]
    pub weight: f64,

    /// Complexity score in 0..=100.
    #[serde(rename = "complexity", default)]
    pub complexity_score: f64,

    /// Raw import specifiers found in the file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Narrative annotation.
    #[serde(default)]
    pub details: NodeDetails,
}

impl GraphNode {
    /// Creates a node with kind-derived presentation defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            group: None,
            language: String::new(),
            color_hint: kind.default_color().to_string(),
            weight: kind.default_weight(),
            complexity_score: 0.0,
            imports: Vec::new(),
            details: NodeDetails::default(),
        }
    }

    /// Sets the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the complexity score, clamped to 0..=100.
    pub fn with_complexity(mut self, score: f64) -> Self {
        self.complexity_score = clamp_complexity(score);
        self
    }
}

/// A relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Id of the source node.
    pub source: String,

    /// Id of the target node.
    pub target: String,

    /// Relationship kind (e.g., "imports").
    #[serde(default)]
    pub relationship: String,

    /// Dependency strength in 0..=1.
    #[serde(default = "default_strength")]
    pub strength: f64,

    /// What the connection does.
    #[serde(default)]
    pub label: String,
}

impl GraphEdge {
    /// Creates an edge with default strength and no label.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: relationship.into(),
            strength: default_strength(),
            label: String::new(),
        }
    }

    /// Sets the strength, clamped to 0..=1.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = clamp_strength(strength);
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Strength assumed when the model omits one.
pub fn default_strength() -> f64 {
    0.5
}

/// Clamps a complexity score into 0..=100, mapping NaN to 0.
pub fn clamp_complexity(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Clamps an edge strength into 0..=1, mapping NaN to the default.
pub fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        default_strength()
    } else {
        strength.clamp(0.0, 1.0)
    }
}

/// Nodes and edges of one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in their original order, unique by id.
    pub nodes: Vec<GraphNode>,
    /// Edges whose endpoints are all present in `nodes`.
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    /// Creates a graph, dropping duplicate node ids (first wins) and
    /// dangling edges.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<GraphNode> = nodes
            .into_iter()
            .filter(|node| seen.insert(node.id.clone()))
            .collect();

        let mut graph = Self { nodes, edges };
        graph.drop_dangling_edges();
        graph
    }

    /// Creates an empty graph.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the set of node ids.
    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Returns true if a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns edges whose source or target is missing from the node set.
    pub fn dangling_edges(&self) -> Vec<&GraphEdge> {
        let ids = self.node_ids();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    /// Removes dangling edges, returning how many were dropped.
    pub fn drop_dangling_edges(&mut self) -> usize {
        let ids: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| ids.contains(&e.source) && ids.contains(&e.target));
        before - self.edges.len()
    }

    /// Returns true if node ids are unique and no edge dangles.
    pub fn is_consistent(&self) -> bool {
        let ids = self.node_ids();
        ids.len() == self.nodes.len() && self.dangling_edges().is_empty()
    }

    /// Sub-graph made of the first `count` nodes and exactly the edges
    /// whose endpoints are both among them.
    ///
    /// The edge set is derived from scratch on every call.
    pub fn prefix(&self, count: usize) -> Graph {
        let count = count.min(self.nodes.len());
        let nodes: Vec<GraphNode> = self.nodes[..count].to_vec();
        let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
            .cloned()
            .collect();
        Graph { nodes, edges }
    }
}
