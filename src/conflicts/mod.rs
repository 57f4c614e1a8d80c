//! Advisory semantic conflict detection
//!
//! Scans constraint statements pairwise for four heuristic conflict shapes:
//! - CONTRADICTORY INVARIANTS: opposing keywords over the same subject
//! - RESOURCE: competing numeric thresholds on a shared resource
//! - TEMPORAL: the same operation required concurrently and in sequence
//! - SCOPE: global versus local wording across categories
//!
//! Reports are hints for a reviewer. They can miss real conflicts and flag
//! harmless pairs, and nothing in graph building or planning reads them.

mod rules;

use serde::{Deserialize, Serialize};

use crate::document::RequirementsDocument;

use rules::{check_pair, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    ContradictoryInvariants,
    ResourceConflict,
    TemporalConflict,
    ScopeConflict,
}

impl ConflictKind {
    /// Severity used in cross-document reports
    pub fn severity(self) -> Severity {
        match self {
            ConflictKind::ContradictoryInvariants => Severity::Blocking,
            ConflictKind::ResourceConflict | ConflictKind::TemporalConflict => {
                Severity::RequiresAcceptance
            }
            ConflictKind::ScopeConflict => Severity::ReviewNeeded,
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::ContradictoryInvariants => write!(f, "contradictory invariants"),
            ConflictKind::ResourceConflict => write!(f, "resource conflict"),
            ConflictKind::TemporalConflict => write!(f, "temporal conflict"),
            ConflictKind::ScopeConflict => write!(f, "scope conflict"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Blocking,
    RequiresAcceptance,
    ReviewNeeded,
}

/// A suspected conflict between two constraints of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticConflict {
    pub kind: ConflictKind,
    pub first: String,
    pub second: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub feature: String,
    /// Number of constraint statements compared
    pub scanned: usize,
    pub conflicts: Vec<SemanticConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn count_of(&self, kind: ConflictKind) -> usize {
        self.conflicts.iter().filter(|c| c.kind == kind).count()
    }
}

/// A constraint reference qualified by the document it came from.
///
/// Ids are namespaced per document: `B1` in one feature and `B1` in another
/// are different items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub document: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDocumentConflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub first: ItemRef,
    pub second: ItemRef,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossDocumentReport {
    pub documents: Vec<String>,
    pub scanned: usize,
    pub conflicts: Vec<CrossDocumentConflict>,
}

impl CrossDocumentReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn count_of_severity(&self, severity: Severity) -> usize {
        self.conflicts
            .iter()
            .filter(|c| c.severity == severity)
            .count()
    }
}

fn statements<'a>(doc: &'a RequirementsDocument, name: &'a str) -> Vec<Statement<'a>> {
    doc.constraints_with_category()
        .map(|(category, c)| Statement::new(name, &c.id, category, c.kind, &c.statement))
        .collect()
}

/// Scan one document. Never fails; an empty document gives an empty report.
pub fn detect_conflicts(doc: &RequirementsDocument) -> ConflictReport {
    let items = statements(doc, &doc.feature);
    let mut conflicts = Vec::new();

    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            for (kind, reason) in check_pair(a, b, true) {
                conflicts.push(SemanticConflict {
                    kind,
                    first: a.id.to_string(),
                    second: b.id.to_string(),
                    reason,
                });
            }
        }
    }

    if !conflicts.is_empty() {
        tracing::debug!(
            feature = %doc.feature,
            conflicts = conflicts.len(),
            "semantic conflict scan flagged constraint pairs"
        );
    }

    ConflictReport {
        feature: doc.feature.clone(),
        scanned: items.len(),
        conflicts,
    }
}

/// Scan pairs of constraints that live in different documents.
///
/// Pairs inside a single document are left to [`detect_conflicts`].
/// Documents without a feature name are labelled `document-<index>`.
pub fn detect_cross_document_conflicts(docs: &[RequirementsDocument]) -> CrossDocumentReport {
    let names: Vec<String> = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            if doc.feature.is_empty() {
                format!("document-{}", i + 1)
            } else {
                doc.feature.clone()
            }
        })
        .collect();

    let per_doc: Vec<Vec<Statement<'_>>> = docs
        .iter()
        .zip(&names)
        .map(|(doc, name)| statements(doc, name))
        .collect();

    let mut conflicts = Vec::new();
    for (i, left) in per_doc.iter().enumerate() {
        for right in &per_doc[i + 1..] {
            for a in left {
                for b in right {
                    for (kind, reason) in check_pair(a, b, false) {
                        conflicts.push(CrossDocumentConflict {
                            kind,
                            severity: kind.severity(),
                            first: ItemRef {
                                document: a.document.to_string(),
                                id: a.id.to_string(),
                            },
                            second: ItemRef {
                                document: b.document.to_string(),
                                id: b.id.to_string(),
                            },
                            reason,
                        });
                    }
                }
            }
        }
    }
    conflicts.sort_by_key(|c| c.severity);
    let scanned = per_doc.iter().map(Vec::len).sum();
    drop(per_doc);

    CrossDocumentReport {
        scanned,
        documents: names,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn test_empty_document() {
        let report = detect_conflicts(&RequirementsDocument::default());
        assert!(report.is_empty());
        assert_eq!(report.scanned, 0);
    }

    #[test]
    fn test_detects_each_kind_once() {
        let doc = parse_document(
            r#"
feature: storage
constraints:
  business:
    - { id: B1, type: invariant, statement: "Customer records are always encrypted at rest" }
    - { id: B2, type: invariant, statement: "Customer records are never encrypted at rest" }
  technical:
    - { id: T1, type: boundary, statement: "Ingest memory stays below 512 MB" }
    - { id: T2, type: boundary, statement: "Ingest memory may reach 4096 MB" }
"#,
        )
        .unwrap();

        let report = detect_conflicts(&doc);
        assert_eq!(report.scanned, 4);
        assert_eq!(report.count_of(ConflictKind::ContradictoryInvariants), 1);
        assert_eq!(report.count_of(ConflictKind::ResourceConflict), 1);

        let contradiction = report
            .conflicts
            .iter()
            .find(|c| c.kind == ConflictKind::ContradictoryInvariants)
            .unwrap();
        assert_eq!((contradiction.first.as_str(), contradiction.second.as_str()), ("B1", "B2"));
    }

    #[test]
    fn test_cross_document_severity() {
        let left = parse_document(
            r#"
feature: billing
constraints:
  business:
    - { id: B1, type: invariant, statement: "Invoices are always emailed to customers" }
"#,
        )
        .unwrap();
        let right = parse_document(
            r#"
feature: privacy
constraints:
  business:
    - { id: B1, type: invariant, statement: "Invoices are never emailed to customers" }
"#,
        )
        .unwrap();

        let report = detect_cross_document_conflicts(&[left, right]);
        assert_eq!(report.documents, vec!["billing", "privacy"]);
        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.severity, Severity::Blocking);
        assert_eq!(conflict.first.document, "billing");
        assert_eq!(conflict.second.document, "privacy");
        assert_eq!(report.count_of_severity(Severity::Blocking), 1);
    }

    #[test]
    fn test_reused_ids_are_independent() {
        let yaml = r#"
feature: FEATURE
constraints:
  business:
    - { id: B1, type: invariant, statement: "Audit logs are retained for 90 days" }
"#;
        let a = parse_document(&yaml.replace("FEATURE", "alpha")).unwrap();
        let b = parse_document(&yaml.replace("FEATURE", "beta")).unwrap();

        let report = detect_cross_document_conflicts(&[a, b]);
        assert_eq!(report.scanned, 2);
        assert!(report.is_empty());
    }

    #[test]
    fn test_cross_document_skips_same_document_pairs() {
        let doc = parse_document(
            r#"
constraints:
  business:
    - { id: B1, type: invariant, statement: "Exports are always signed by the service" }
    - { id: B2, type: invariant, statement: "Exports are never signed by the service" }
"#,
        )
        .unwrap();

        let report = detect_cross_document_conflicts(&[doc]);
        assert_eq!(report.documents, vec!["document-1"]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_cross_document_empty_input() {
        let report = detect_cross_document_conflicts(&[]);
        assert!(report.is_empty());
        assert!(report.documents.is_empty());
    }
}
