//! Graph construction from a requirements document

use std::collections::{BTreeMap, HashSet};

use crate::config::WeftConfig;
use crate::document::{RequirementsDocument, VerificationOutcome};

use super::hints::{HintExtractor, LegacyChainExtractor};
use super::nodes::{ConstraintNode, NodeStatus, NodeType};
use super::{ConstraintGraph, GraphEdges};

/// Builds a [`ConstraintGraph`] from a requirements document.
///
/// Hint extraction is off unless an extractor is installed.
#[derive(Default)]
pub struct GraphBuilder {
    hints: Option<Box<dyn HintExtractor>>,
}

/// Build a graph with the default builder (no hint extraction)
pub fn build_graph(doc: &RequirementsDocument) -> ConstraintGraph {
    GraphBuilder::new().build(doc)
}

/// Synthesize a node id from an artifact path
pub fn artifact_id(path: &str) -> String {
    let sanitized: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("artifact-{sanitized}")
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { hints: None }
    }

    /// Builder configured from `weft.toml` settings
    pub fn from_config(config: &WeftConfig) -> Self {
        if config.legacy_hints {
            Self::new().with_hint_extractor(LegacyChainExtractor::new())
        } else {
            Self::new()
        }
    }

    pub fn with_hint_extractor(mut self, extractor: impl HintExtractor + 'static) -> Self {
        self.hints = Some(Box::new(extractor));
        self
    }

    /// Build the graph.
    ///
    /// Order matters: tensions edit the `conflicts_with` of constraint nodes
    /// created before them, and `blocks` is derived only once every
    /// `depends_on` list (hints included) is final.
    pub fn build(&self, doc: &RequirementsDocument) -> ConstraintGraph {
        let mut nodes: BTreeMap<String, ConstraintNode> = BTreeMap::new();
        let mut edges = GraphEdges::default();

        add_constraint_nodes(doc, &mut nodes);
        add_tension_nodes(doc, &mut nodes, &mut edges);
        add_required_truth_nodes(doc, &mut nodes);
        add_artifact_nodes(doc, &mut nodes, &mut edges);

        if let (Some(extractor), Some(chain)) = (&self.hints, &doc.dependency_chain) {
            apply_hints(extractor.as_ref(), chain, &mut nodes);
        }

        populate_blocks(&mut nodes);

        // Flattened for renderers
        for node in nodes.values() {
            for dep in &node.depends_on {
                edges.dependencies.push((node.id.clone(), dep.clone()));
            }
        }

        derive_blocked(&mut nodes);

        tracing::debug!(
            feature = %doc.feature,
            nodes = nodes.len(),
            dependencies = edges.dependencies.len(),
            conflicts = edges.conflicts.len(),
            satisfies = edges.satisfies.len(),
            "built constraint graph"
        );

        ConstraintGraph::new(doc.feature.clone(), nodes, edges)
    }
}

/// Insert unless the id is taken. Returns false when the node was dropped,
/// in which case the caller must not emit edges for it.
fn insert_node(nodes: &mut BTreeMap<String, ConstraintNode>, node: ConstraintNode) -> bool {
    if nodes.contains_key(&node.id) {
        tracing::warn!(
            id = %node.id,
            "duplicate node id, keeping the first definition"
        );
        return false;
    }
    nodes.insert(node.id.clone(), node);
    true
}

fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn add_constraint_nodes(doc: &RequirementsDocument, nodes: &mut BTreeMap<String, ConstraintNode>) {
    let verification = doc.verification.as_ref();
    let overall_passed = verification
        .and_then(|v| v.overall_passed)
        .unwrap_or(false);

    for (_, constraint) in doc.constraints_with_category() {
        let mut node =
            ConstraintNode::new(&constraint.id, NodeType::Constraint, &constraint.statement);
        node.depends_on = dedup_ids(&constraint.depends_on);
        node.critical_path = constraint.kind == crate::document::ConstraintKind::Invariant;

        // Per-item evidence first; the coarse flag only fills the gaps
        let item = verification.and_then(|v| v.items.get(&constraint.id));
        node.status = match item {
            Some(VerificationOutcome::Passed) => NodeStatus::Satisfied,
            Some(VerificationOutcome::Failed) => NodeStatus::Required,
            None if overall_passed => NodeStatus::Satisfied,
            None => NodeStatus::Required,
        };

        insert_node(nodes, node);
    }
}

fn add_tension_nodes(
    doc: &RequirementsDocument,
    nodes: &mut BTreeMap<String, ConstraintNode>,
    edges: &mut GraphEdges,
) {
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();

    for tension in &doc.tensions {
        let between = dedup_ids(&tension.between);

        let mut node = ConstraintNode::new(&tension.id, NodeType::Tension, &tension.description);
        node.depends_on = between.clone();
        node.status = if tension.status.eq_ignore_ascii_case("resolved") {
            NodeStatus::Satisfied
        } else {
            NodeStatus::Conflicted
        };
        if !insert_node(nodes, node) {
            continue;
        }

        for (i, a) in between.iter().enumerate() {
            for b in &between[i + 1..] {
                let key = if a < b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                if !seen_pairs.insert(key) {
                    continue;
                }
                edges.conflicts.push((a.clone(), b.clone()));
                link_conflict(nodes, a, b);
                link_conflict(nodes, b, a);
            }
        }
    }
}

fn link_conflict(nodes: &mut BTreeMap<String, ConstraintNode>, id: &str, other: &str) {
    if let Some(node) = nodes.get_mut(id) {
        if !node.conflicts_with.iter().any(|c| c == other) {
            node.conflicts_with.push(other.to_string());
        }
    }
}

/// Map a required truth's document status onto a node status
fn truth_status(status: &str) -> NodeStatus {
    match status.to_ascii_uppercase().as_str() {
        "SATISFIED" => NodeStatus::Satisfied,
        "PARTIAL" | "NOT_SATISFIED" | "SPECIFICATION_READY" => NodeStatus::Required,
        _ => NodeStatus::Unknown,
    }
}

fn add_required_truth_nodes(
    doc: &RequirementsDocument,
    nodes: &mut BTreeMap<String, ConstraintNode>,
) {
    for truth in &doc.required_truths {
        let mut node = ConstraintNode::new(&truth.id, NodeType::RequiredTruth, &truth.statement);
        node.depends_on = dedup_ids(&truth.maps_to_constraints);
        node.status = truth_status(&truth.status);
        node.critical_path = truth.priority == Some(1);
        insert_node(nodes, node);
    }
}

fn add_artifact_nodes(
    doc: &RequirementsDocument,
    nodes: &mut BTreeMap<String, ConstraintNode>,
    edges: &mut GraphEdges,
) {
    for artifact in &doc.artifacts {
        let id = unique_artifact_id(nodes, &artifact.path);
        let mut node = ConstraintNode::new(&id, NodeType::Artifact, &artifact.path);
        node.depends_on = dedup_ids(&artifact.satisfies);
        node.status = if artifact.status.eq_ignore_ascii_case("verified") {
            NodeStatus::Satisfied
        } else {
            NodeStatus::Required
        };

        let satisfies: Vec<(String, String)> = node
            .depends_on
            .iter()
            .map(|requirement| (id.clone(), requirement.clone()))
            .collect();
        if insert_node(nodes, node) {
            edges.satisfies.extend(satisfies);
        }
    }
}

/// Artifact id for `path`, suffixed with `_2`, `_3`, ... when another node
/// already holds the sanitized id (e.g. `a-b.rs` and `a_b.rs`)
fn unique_artifact_id(nodes: &BTreeMap<String, ConstraintNode>, path: &str) -> String {
    let base = artifact_id(path);
    if !nodes.contains_key(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let id = format!("{base}_{n}");
        if !nodes.contains_key(&id) {
            tracing::warn!(
                path,
                %id,
                "artifact id collides with an existing node, using a suffixed id"
            );
            return id;
        }
        n += 1;
    }
}

fn apply_hints(
    extractor: &dyn HintExtractor,
    chain: &crate::document::DependencyChain,
    nodes: &mut BTreeMap<String, ConstraintNode>,
) {
    for hint in extractor.extract(chain) {
        if hint.dependent == hint.dependency || !nodes.contains_key(&hint.dependency) {
            continue;
        }
        let Some(node) = nodes.get_mut(&hint.dependent) else {
            continue;
        };
        if node.depends_on.contains(&hint.dependency) {
            continue;
        }
        tracing::debug!(
            dependent = %hint.dependent,
            dependency = %hint.dependency,
            "adding dependency from legacy chain"
        );
        node.depends_on.push(hint.dependency);
    }
}

/// Fill `blocks` as the exact reverse adjacency of `depends_on`
fn populate_blocks(nodes: &mut BTreeMap<String, ConstraintNode>) {
    let reverse: Vec<(String, String)> = nodes
        .values()
        .flat_map(|n| n.depends_on.iter().map(|dep| (dep.clone(), n.id.clone())))
        .collect();

    for node in nodes.values_mut() {
        node.blocks.clear();
    }
    for (dependency, dependent) in reverse {
        if let Some(node) = nodes.get_mut(&dependency) {
            node.blocks.push(dependent);
        }
    }
    for node in nodes.values_mut() {
        node.blocks.sort();
        node.blocks.dedup();
    }
}

/// Nodes still waiting on an unsatisfied dependency start out BLOCKED
fn derive_blocked(nodes: &mut BTreeMap<String, ConstraintNode>) {
    let satisfied: HashSet<String> = nodes
        .values()
        .filter(|n| n.status == NodeStatus::Satisfied)
        .map(|n| n.id.clone())
        .collect();

    let blocked: Vec<String> = nodes
        .values()
        .filter(|n| matches!(n.status, NodeStatus::Required | NodeStatus::Unknown))
        .filter(|n| {
            n.depends_on
                .iter()
                .any(|dep| nodes.contains_key(dep) && !satisfied.contains(dep))
        })
        .map(|n| n.id.clone())
        .collect();

    for id in blocked {
        if let Some(node) = nodes.get_mut(&id) {
            node.status = NodeStatus::Blocked;
        }
    }
}
