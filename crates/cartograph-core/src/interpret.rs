//! Lenient reading of recovered objects into typed values.
//!
//! Model output is never trusted to match a schema: unknown fields are
//! ignored, missing fields default, and elements that cannot be read at all
//! are skipped rather than failing the whole object.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use cartograph_models::{
    clamp_complexity, clamp_strength, default_strength, ArchitectureSummary, FileRecord,
    GraphEdge, GraphNode, NodeDetails, NodeKind, ScanMetadata,
};

/// Reads a string, or a number rendered as a string.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(text_of)
}

fn number_field(object: &Value, key: &str) -> Option<f64> {
    let number = match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn string_list(object: &Value, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(text_of).collect())
        .unwrap_or_default()
}

/// Reads one node, returning `None` when it has no usable id.
pub fn read_node(value: &Value) -> Option<GraphNode> {
    if !value.is_object() {
        return None;
    }
    let id = string_field(value, "id")?;
    let name = string_field(value, "name").unwrap_or_else(|| id.clone());
    let kind = string_field(value, "type")
        .or_else(|| string_field(value, "kind"))
        .and_then(|k| NodeKind::parse(&k))
        .unwrap_or_default();

    let mut node = GraphNode::new(id, name, kind);
    node.group = string_field(value, "group");
    node.language = string_field(value, "language").unwrap_or_default();
    if let Some(color) = string_field(value, "color") {
        node.color_hint = color;
    }
    if let Some(weight) = number_field(value, "val").filter(|w| *w > 0.0) {
        node.weight = weight;
    }
    node.complexity_score = number_field(value, "complexity")
        .map(clamp_complexity)
        .unwrap_or_default();
    node.imports = string_list(value, "imports");
    node.details = value
        .get("details")
        .map(|details| read_lenient::<NodeDetails>(details).unwrap_or_default())
        .unwrap_or_default();

    Some(node)
}

/// Reads an edge endpoint: an id, or an object carrying one.
fn endpoint(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => string_field(value, "id"),
        other => text_of(other),
    }
}

/// Reads one edge, returning `None` when either endpoint is missing.
pub fn read_edge(value: &Value) -> Option<GraphEdge> {
    let source = value.get("source").and_then(endpoint)?;
    let target = value.get("target").and_then(endpoint)?;
    let relationship = string_field(value, "relationship")
        .or_else(|| string_field(value, "type"))
        .unwrap_or_default();

    let mut edge = GraphEdge::new(source, target, relationship);
    edge.strength = number_field(value, "strength")
        .map(clamp_strength)
        .unwrap_or_else(default_strength);
    edge.label = string_field(value, "label").unwrap_or_default();
    Some(edge)
}

/// Reads every usable node of `object["nodes"]`, in order.
pub fn read_nodes(object: &Value) -> Vec<GraphNode> {
    let Some(items) = object.get("nodes").and_then(Value::as_array) else {
        return Vec::new();
    };
    let nodes: Vec<GraphNode> = items.iter().filter_map(read_node).collect();
    if nodes.len() < items.len() {
        debug!(
            skipped = items.len() - nodes.len(),
            "skipped nodes without a usable id"
        );
    }
    nodes
}

/// Reads every usable edge of `object["links"]`, or of `object["edges"]`
/// when there is no `links` array.
pub fn read_edges(object: &Value) -> Vec<GraphEdge> {
    object
        .get("links")
        .and_then(Value::as_array)
        .or_else(|| object.get("edges").and_then(Value::as_array))
        .map(|items| items.iter().filter_map(read_edge).collect())
        .unwrap_or_default()
}

/// Reads the `architecture` narrative if present.
pub fn read_architecture(object: &Value) -> Option<ArchitectureSummary> {
    let value = object.get("architecture").filter(|v| v.is_object())?;
    read_lenient(value)
}

/// Reads a `file_list` payload, skipping entries without a path.
pub fn read_file_list(payload: &Value) -> Vec<FileRecord> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.get("relative_path").and_then(text_of).is_some())
        .filter_map(read_lenient::<FileRecord>)
        .map(|mut file| {
            file.relative_path = file.relative_path.replace('\\', "/");
            file
        })
        .collect()
}

/// Reads a `metadata` payload.
pub fn read_metadata(payload: &Value) -> Option<ScanMetadata> {
    payload.is_object().then(|| read_lenient(payload)).flatten()
}

/// Deserializes into a type whose fields all default.
pub fn read_lenient<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(error = %e, "lenient read failed");
            None
        }
    }
}
