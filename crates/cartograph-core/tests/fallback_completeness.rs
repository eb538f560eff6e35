//! Reconciliation properties over whole payloads.

use cartograph_core::{interpret, Reconciler, Report};
use cartograph_models::{FileRecord, NodeKind, ReportKind};

fn five_files() -> Vec<FileRecord> {
    vec![
        FileRecord::new("index.ts", "TypeScript"),
        FileRecord::new("src/routes/users.ts", "TypeScript").with_complexity(31.5),
        FileRecord::new("src/APP.tsx", "React TSX"),
        FileRecord::new("package.json", "Package JSON"),
        FileRecord::new("docs/main_notes.md", "Markdown"),
    ]
}

#[test]
fn test_zero_recovered_nodes_yield_one_node_per_file() {
    let files = five_files();
    let result = interpret(
        ReportKind::Architecture,
        "{\"nodes\": [], \"links\": [{\"source\": \"index.ts\", \"target\": \"src/APP.tsx\"}]}",
        &files,
        &Reconciler::new(),
    );

    let Report::Architecture(reconciliation) = result.report else {
        panic!("expected an architecture report");
    };
    let graph = reconciliation.graph;

    assert_eq!(graph.node_count(), 5);
    for file in &files {
        assert!(graph.contains_node(&file.relative_path));
    }

    let entries: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Entry)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(entries, vec!["index.ts", "src/APP.tsx"]);

    assert_eq!(graph.edge_count(), 1);
    assert!(graph.is_consistent());
}

#[test]
fn test_truncated_payload_is_completed_and_consistent() {
    let files = five_files();
    let payload = concat!(
        "Let me map this repository.\n",
        "{\"nodes\":[{\"id\":\"index.ts\",\"type\":\"star\",\"val\":18},",
        "{\"id\":\"src/routes/users.ts\",\"type\":\"planet\"}],",
        "\"links\":[{\"source\":\"index.ts\",\"target\":\"src/routes/users.ts\",\"strength\":0.9},",
        "{\"source\":\"src/routes/users.ts\",\"target\":\"src/db.ts\"},",
        "{\"source\":\"index.ts\",\"tar"
    );

    let result = interpret(ReportKind::Architecture, payload, &files, &Reconciler::new());
    let reconciliation = result.report.reconciliation().unwrap();

    assert_eq!(reconciliation.recovered_nodes, 2);
    assert_eq!(reconciliation.synthesized_nodes, 0);
    assert_eq!(reconciliation.graph.node("index.ts").unwrap().weight, 18.0);
    assert_eq!(reconciliation.graph.edge_count(), 1);
    assert_eq!(reconciliation.dropped_edges, 1);
    assert!(reconciliation.graph.is_consistent());
}
