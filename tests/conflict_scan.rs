//! Integration tests for the advisory conflict scan over documents on disk

use std::fs;

use tempfile::TempDir;
use weft::conflicts::{ConflictKind, Severity};
use weft::{detect_conflicts, detect_cross_document_conflicts, load_document, GraphBuilder};

const STORAGE: &str = r#"
feature: storage
constraints:
  business:
    - { id: B1, type: invariant, statement: "Customer records are always encrypted at rest" }
  technical:
    - { id: T1, type: boundary, statement: "Replication writes happen concurrently across regions" }
    - { id: T2, type: boundary, statement: "Replication writes happen sequentially per shard" }
"#;

const ANALYTICS: &str = r#"
feature: analytics
constraints:
  business:
    - { id: B1, type: invariant, statement: "Customer records are never encrypted at rest" }
  technical:
    - { id: T1, type: boundary, statement: "Query memory stays below 256 MB" }
"#;

const REPORTING: &str = r#"
feature: reporting
constraints:
  technical:
    - { id: T1, type: boundary, statement: "Query memory may grow to 1024 MB" }
"#;

#[test]
fn test_single_document_scan() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("storage.yaml");
    fs::write(&path, STORAGE).unwrap();

    let doc = load_document(&path).unwrap();
    let report = detect_conflicts(&doc);

    assert_eq!(report.feature, "storage");
    assert_eq!(report.scanned, 3);
    assert_eq!(report.count_of(ConflictKind::TemporalConflict), 1);
    assert_eq!(report.count_of(ConflictKind::ContradictoryInvariants), 0);

    // Flags never become graph edges
    let graph = GraphBuilder::new().build(&doc);
    assert!(graph.edges().conflicts.is_empty());
}

#[test]
fn test_cross_document_scan_orders_by_severity() {
    let temp_dir = TempDir::new().unwrap();
    let mut docs = Vec::new();
    for (name, content) in [
        ("storage.yaml", STORAGE),
        ("analytics.yaml", ANALYTICS),
        ("reporting.yaml", REPORTING),
    ] {
        let path = temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        docs.push(load_document(&path).unwrap());
    }

    let report = detect_cross_document_conflicts(&docs);

    assert_eq!(report.documents, vec!["storage", "analytics", "reporting"]);
    assert_eq!(report.scanned, 6);
    assert_eq!(report.count_of_severity(Severity::Blocking), 1);
    assert_eq!(report.count_of_severity(Severity::RequiresAcceptance), 1);

    let first = &report.conflicts[0];
    assert_eq!(first.kind, ConflictKind::ContradictoryInvariants);
    assert_eq!(first.first.document, "storage");
    assert_eq!(first.second.document, "analytics");
    assert_eq!(first.first.id, "B1");
    assert_eq!(first.second.id, "B1");

    let resource = report
        .conflicts
        .iter()
        .find(|c| c.kind == ConflictKind::ResourceConflict)
        .unwrap();
    assert_eq!(resource.first.document, "analytics");
    assert_eq!(resource.second.document, "reporting");

    // The temporal pair lives inside one document and is not reported here
    assert!(report
        .conflicts
        .iter()
        .all(|c| c.first.document != c.second.document));
}
