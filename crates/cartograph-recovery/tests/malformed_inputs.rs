//! Recovery against output shapes observed from real generations.

use cartograph_recovery::{recover, RecoveryError, RecoveryStage};
use serde_json::json;

#[test]
fn test_prose_wrapped_truncated_object() {
    let recovered = recover("reasoning text {\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"}").unwrap();

    let ids: Vec<&str> = recovered.value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(recovered.stage.is_partial());
}

#[test]
fn test_trailing_comma_in_nodes() {
    let recovered = recover("{\"nodes\":[{\"id\":\"a\"},],\"edges\":[]}").unwrap();

    assert_eq!(recovered.value["nodes"], json!([{"id": "a"}]));
    assert_eq!(recovered.value["edges"], json!([]));
}

#[test]
fn test_valid_object_is_returned_unchanged() {
    let original = json!({
        "nodes": [{"id": "src/main.rs", "type": "entry", "val": 15}],
        "links": [],
        "architecture": {"pattern": "layered", "summary": "A small CLI, with commas, ]"}
    });
    let text = format!("Here is the graph:\n```json\n{original}\n```");

    let recovered = recover(&text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::DirectParse);
    assert_eq!(recovered.value, original);

    let again = recover(&recovered.value.to_string()).unwrap();
    assert_eq!(again.value, original);
}

#[test]
fn test_pretty_printed_with_multiline_purpose() {
    let text = r#"{
  "nodes": [
    {
      "id": "app.py",
      "details": {
        "purpose": "Entry point.
Wires routes and starts the server."
      }
    },
  ],
  "links": []
}"#;

    let recovered = recover(text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::StringNewlines);
    assert_eq!(
        recovered.value["nodes"][0]["details"]["purpose"],
        "Entry point.\nWires routes and starts the server."
    );
}

#[test]
fn test_cut_off_inside_links() {
    let text = concat!(
        "{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"},{\"id\":\"c\"}],",
        "\"links\":[{\"source\":\"a\",\"target\":\"b\",\"strength\":0.8},",
        "{\"source\":\"b\",\"target\":\"c\",\"relationship\":\"imp"
    );

    let recovered = recover(text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::TruncationRepair);
    assert_eq!(recovered.value["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(recovered.value["links"].as_array().unwrap().len(), 1);
}

#[test]
fn test_salvages_nodes_when_rest_is_garbage() {
    let text = "{\"nodes\":[{\"id\":\"a\"}],\"links\":[{\"source\" \"a\"}],\"architecture\":{}}";

    let recovered = recover(text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::PartialNodes);
    assert_eq!(recovered.value, json!({"nodes": [{"id": "a"}]}));
}

#[test]
fn test_plain_prose_has_no_structured_content() {
    let err = recover("The repository appears to be empty.").unwrap_err();
    assert_eq!(err, RecoveryError::NoStructuredContent);
}

#[test]
fn test_line_break_after_escaped_quotes() {
    let text = "{\"nodes\":[{\"id\":\"a\",\"purpose\":\"say \\\"hi\\\"\nmore\"}],\"links\":[{\"source\":\"a\",\"target\":\"a\"}]}";

    let recovered = recover(text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::StringNewlines);
    assert_eq!(recovered.value["nodes"][0]["purpose"], "say \"hi\"\nmore");
    assert_eq!(recovered.value["links"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cut_off_inside_string_holding_a_brace() {
    let text = "{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\",\"label\":\"x}";

    let recovered = recover(text).unwrap();
    assert_eq!(recovered.stage, RecoveryStage::TruncationRepair);
    assert_eq!(recovered.value, json!({"nodes": [{"id": "a"}, {"id": "b"}]}));
}
