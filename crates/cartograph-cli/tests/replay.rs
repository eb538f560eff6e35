//! Runs CLI commands against captured streams.

use serde_json::{json, Value};

use cartograph_cli::cli::{Commands, ExportChoice, ReportChoice, ScanArgs};
use cartograph_cli::commands;
use cartograph_core::CartographConfig;

fn frame(kind: &str, content: Value) -> String {
    format!("data: {}\n\n", json!({ "type": kind, "content": content }))
}

fn capture(dir: &tempfile::TempDir, name: &str, frames: &[String]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, frames.concat()).unwrap();
    path
}

fn replay(path: std::path::PathBuf) -> ScanArgs {
    ScanArgs {
        replay: Some(path),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_analyze_replay_exports_reconciled_graph() {
    let dir = tempfile::tempdir().unwrap();
    let payload = "```json\n{\"nodes\": [{\"id\": \"app.py\", \"type\": \"entry\"},], \
                   \"links\": [{\"source\": \"app.py\", \"target\": \"models.py\"}]";
    let path = capture(
        &dir,
        "analyze.sse",
        &[
            frame("metadata", json!({"name": "shop", "total_files": 3})),
            frame(
                "file_list",
                json!([
                    {"relative_path": "app.py", "language": "Python"},
                    {"relative_path": "models.py", "language": "Python"},
                    {"relative_path": "views.py", "language": "Python"}
                ]),
            ),
            frame("thought", json!("Mapping imports.")),
            frame("content", json!(payload)),
            frame("done", Value::Null),
        ],
    );
    let output = dir.path().join("out/graph.json");

    commands::execute(
        Commands::Analyze {
            target: "/src/shop".into(),
            scan: replay(path),
            export: Some(ExportChoice::Json),
            output: Some(output.clone()),
            no_reveal: false,
        },
        CartographConfig::new(),
    )
    .await
    .unwrap();

    let exported: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let ids: Vec<&str> = exported["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&"app.py"));
    assert!(ids.contains(&"models.py"));
    assert!(ids.contains(&"views.py"));
    assert_eq!(exported["links"].as_array().unwrap().len(), 1);
    assert_eq!(exported["metadata"]["name"], "shop");
}

#[tokio::test]
async fn test_report_replay_upstream_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = capture(
        &dir,
        "error.sse",
        &[
            frame("thought", json!("Looking for secrets.")),
            frame("error", json!("quota exceeded")),
        ],
    );

    let err = commands::execute(
        Commands::Report {
            kind: ReportChoice::Security,
            target: "/src/shop".into(),
            scan: replay(path),
        },
        CartographConfig::new(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_ask_replay_prints_answer() {
    let dir = tempfile::tempdir().unwrap();
    let path = capture(
        &dir,
        "ask.sse",
        &[
            frame("answer", json!("Requests enter through ")),
            frame("answer", json!("app.py.")),
            frame("done", Value::Null),
        ],
    );

    commands::execute(
        Commands::Ask {
            target: "/src/shop".into(),
            question: "Where do requests enter?".into(),
            scan: replay(path),
        },
        CartographConfig::new(),
    )
    .await
    .unwrap();
}
