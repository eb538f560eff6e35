//! The ordered recovery chain.
//!
//! Stages run strictly in order and stop at the first successful parse.
//! Each stage is more aggressive and more lossy than the one before it, and
//! each repair builds on the text produced by the previous one.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::error::{RecoveryError, Result};
use crate::repair::{
    bound, close_truncated, escape_string_newlines, matching_close, strip_trailing_commas,
};

/// Start of a `"nodes": [` array.
static NODES_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""nodes"\s*:\s*\["#).expect("Invalid nodes array regex"));

/// Stage of the chain that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecoveryStage {
    /// The bounded span parsed as-is.
    DirectParse,
    /// Trailing commas removed.
    TrailingCommas,
    /// Raw newlines inside string values escaped.
    StringNewlines,
    /// Incomplete tail dropped and open containers closed.
    TruncationRepair,
    /// Only the `nodes` array could be salvaged.
    PartialNodes,
}

impl RecoveryStage {
    /// Every stage, in execution order.
    pub const ALL: [RecoveryStage; 5] = [
        RecoveryStage::DirectParse,
        RecoveryStage::TrailingCommas,
        RecoveryStage::StringNewlines,
        RecoveryStage::TruncationRepair,
        RecoveryStage::PartialNodes,
    ];

    /// Returns true for every stage after a direct parse.
    pub fn is_partial(&self) -> bool {
        !matches!(self, RecoveryStage::DirectParse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStage::DirectParse => "direct_parse",
            RecoveryStage::TrailingCommas => "trailing_commas",
            RecoveryStage::StringNewlines => "string_newlines",
            RecoveryStage::TruncationRepair => "truncation_repair",
            RecoveryStage::PartialNodes => "partial_nodes",
        }
    }
}

impl std::fmt::Display for RecoveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured object and the stage that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub value: Value,
    pub stage: RecoveryStage,
}

/// Attempts to parse text as a JSON object.
fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "parse attempt failed");
            None
        }
    }
}

/// Stage 2: parse the bounded span untouched.
pub fn direct_parse(slice: &str) -> Option<Value> {
    parse_object(slice)
}

/// Stage 3: parse after removing trailing commas.
pub fn parse_without_trailing_commas(text: &str) -> (String, Option<Value>) {
    let repaired = strip_trailing_commas(text).into_owned();
    let value = parse_object(&repaired);
    (repaired, value)
}

/// Stage 4: parse after escaping raw newlines in string values.
pub fn parse_with_escaped_newlines(text: &str) -> (String, Option<Value>) {
    let repaired = escape_string_newlines(text).into_owned();
    let value = parse_object(&repaired);
    (repaired, value)
}

/// Stage 5: parse after balancing a truncated object.
pub fn parse_truncated(text: &str) -> (String, Option<Value>) {
    let repaired = close_truncated(text);
    let value = parse_object(&repaired);
    (repaired, value)
}

/// Stage 6: salvage the first balanced `"nodes": [...]` array alone.
pub fn extract_nodes(text: &str) -> Option<Value> {
    let found = NODES_ARRAY.find(text)?;
    let open = found.end() - 1;
    let close = matching_close(text, open)?;

    let array = strip_trailing_commas(&text[open..=close]).into_owned();
    match serde_json::from_str::<Value>(&array) {
        Ok(nodes @ Value::Array(_)) => {
            let mut object = Map::new();
            object.insert("nodes".to_string(), nodes);
            Some(Value::Object(object))
        }
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "nodes array did not parse");
            None
        }
    }
}

/// Runs the full chain over accumulated model output.
///
/// Returns [`RecoveryError::NoStructuredContent`] when the text holds no
/// `{` ... `}` span, and [`RecoveryError::Unrecoverable`] when every stage
/// fails. Neither is fatal to a scan.
pub fn recover(text: &str) -> Result<Recovered> {
    let slice = bound(text).ok_or(RecoveryError::NoStructuredContent)?;

    if let Some(value) = direct_parse(slice) {
        return Ok(Recovered {
            value,
            stage: RecoveryStage::DirectParse,
        });
    }

    let repairs: [(RecoveryStage, fn(&str) -> (String, Option<Value>)); 3] = [
        (RecoveryStage::TrailingCommas, parse_without_trailing_commas),
        (RecoveryStage::StringNewlines, parse_with_escaped_newlines),
        (RecoveryStage::TruncationRepair, parse_truncated),
    ];

    let mut current = slice.to_string();
    for (stage, repair) in repairs {
        let (repaired, value) = repair(&current);
        if let Some(value) = value {
            return Ok(partial(value, stage));
        }
        current = repaired;
    }

    // The truncation stage's output may carry synthetic closers; salvage
    // from the text before them.
    let salvage_source = escape_string_newlines(&strip_trailing_commas(slice)).into_owned();
    extract_nodes(&salvage_source)
        .map(|value| partial(value, RecoveryStage::PartialNodes))
        .ok_or(RecoveryError::Unrecoverable)
}

fn partial(value: Value, stage: RecoveryStage) -> Recovered {
    info!(stage = %stage, "structured object recovered after repair");
    Recovered { value, stage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse_wins_for_valid_input() {
        let text = "I will now output the graph.\n{\"nodes\":[{\"id\":\"a, ]\"}],\"links\":[]}\nDone.";
        let recovered = recover(text).unwrap();

        assert_eq!(recovered.stage, RecoveryStage::DirectParse);
        assert_eq!(recovered.value["nodes"][0]["id"], "a, ]");
    }

    #[test]
    fn test_trailing_comma_stage() {
        let recovered = recover("{\"nodes\":[{\"id\":\"a\"},],\"edges\":[]}").unwrap();

        assert_eq!(recovered.stage, RecoveryStage::TrailingCommas);
        assert_eq!(recovered.value, json!({"nodes": [{"id": "a"}], "edges": []}));
    }

    #[test]
    fn test_string_newline_stage() {
        let text = "{\"nodes\":[{\"id\":\"a\",\"details\":{\"purpose\":\"Loads config\nand starts the app\"}},]}";
        let recovered = recover(text).unwrap();

        assert_eq!(recovered.stage, RecoveryStage::StringNewlines);
        assert_eq!(
            recovered.value["nodes"][0]["details"]["purpose"],
            "Loads config\nand starts the app"
        );
    }

    #[test]
    fn test_truncation_stage() {
        let recovered = recover("reasoning text {\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"}").unwrap();

        assert_eq!(recovered.stage, RecoveryStage::TruncationRepair);
        assert_eq!(recovered.value, json!({"nodes": [{"id": "a"}, {"id": "b"}]}));
    }

    #[test]
    fn test_truncation_mid_value_drops_partial_element() {
        let text = "{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"}],\"links\":[{\"source\":\"a\",\"target\":\"b\"},{\"source\":\"b\",\"tar";
        let recovered = recover(text).unwrap();

        assert_eq!(recovered.stage, RecoveryStage::TruncationRepair);
        assert_eq!(recovered.value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(recovered.value["links"], json!([{"source": "a", "target": "b"}]));
    }

    #[test]
    fn test_partial_nodes_fallback() {
        let text = "{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\",}],\"links\":[{\"source\":\"a\" \"target\":\"b\"}],\"architecture\":{\"summary\":\"x\"}}";
        let recovered = recover(text).unwrap();

        assert_eq!(recovered.stage, RecoveryStage::PartialNodes);
        assert_eq!(recovered.value, json!({"nodes": [{"id": "a"}, {"id": "b"}]}));
    }

    #[test]
    fn test_no_structured_content() {
        assert_eq!(
            recover("I could not analyze this repository.").unwrap_err(),
            RecoveryError::NoStructuredContent
        );
        assert_eq!(recover("").unwrap_err(), RecoveryError::NoStructuredContent);
    }

    #[test]
    fn test_unrecoverable() {
        assert_eq!(
            recover("{\"summary\" \"missing colon\" }").unwrap_err(),
            RecoveryError::Unrecoverable
        );
    }

    #[test]
    fn test_stage_order() {
        let mut sorted = RecoveryStage::ALL;
        sorted.sort();
        assert_eq!(sorted, RecoveryStage::ALL);
        assert!(!RecoveryStage::DirectParse.is_partial());
        assert!(RecoveryStage::PartialNodes.is_partial());
    }
}
