//! Constraint graph: requirement artifacts and the edges between them

mod builder;
pub mod hints;
mod nodes;
mod query;
mod tracker;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use builder::{artifact_id, build_graph, GraphBuilder};
pub use hints::{DependencyHint, HintExtractor, LegacyChainExtractor};
pub use nodes::{ConstraintNode, NodeStatus, NodeType};
pub use query::{get_conflicts, what_does_this_block, what_must_be_true};
pub use tracker::{mark_many_satisfied, mark_satisfied, Progress, SatisfactionDelta};

/// Graph format version written into every built graph
pub const GRAPH_VERSION: &str = "1.0";

/// The three edge classes of a constraint graph.
///
/// `satisfies` records fulfillment (artifact -> requirement) and is never
/// part of the temporal `dependencies` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdges {
    /// (from, to): `from` depends on `to`
    pub dependencies: Vec<(String, String)>,
    /// Unordered pairs
    pub conflicts: Vec<(String, String)>,
    /// (artifact, requirement)
    pub satisfies: Vec<(String, String)>,
}

/// Dependency graph built from one feature's requirements document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintGraph {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub feature: String,
    nodes: BTreeMap<String, ConstraintNode>,
    edges: GraphEdges,
}

impl ConstraintGraph {
    pub(crate) fn new(
        feature: String,
        nodes: BTreeMap<String, ConstraintNode>,
        edges: GraphEdges,
    ) -> Self {
        Self {
            version: GRAPH_VERSION.to_string(),
            generated_at: Utc::now(),
            feature,
            nodes,
            edges,
        }
    }

    /// Get a specific node by ID
    pub fn get_node(&self, id: &str) -> Option<&ConstraintNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_node_mut(&mut self, id: &str) -> Option<&mut ConstraintNode> {
        self.nodes.get_mut(id)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &ConstraintNode> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> &GraphEdges {
        &self.edges
    }

    /// A dependency counts as satisfied when its node is SATISFIED or when it
    /// does not exist in the graph at all.
    pub fn is_dependency_satisfied(&self, id: &str) -> bool {
        match self.nodes.get(id) {
            Some(node) => node.status == NodeStatus::Satisfied,
            None => true,
        }
    }

    /// Whether a node is not yet satisfied but has every dependency satisfied
    pub fn is_ready(&self, node: &ConstraintNode) -> bool {
        node.status != NodeStatus::Satisfied
            && node
                .depends_on
                .iter()
                .all(|dep| self.is_dependency_satisfied(dep))
    }

    /// IDs of every ready node, in id order
    pub fn ready_nodes(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|n| self.is_ready(n))
            .map(|n| n.id.clone())
            .collect()
    }

    /// Compare nodes and edges, ignoring `generated_at`
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.feature == other.feature
            && self.nodes == other.nodes
            && self.edges == other.edges
    }
}
