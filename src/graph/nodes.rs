//! Graph node types for the constraint graph

use serde::{Deserialize, Serialize};

/// Which kind of requirement artifact a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Constraint,
    Tension,
    RequiredTruth,
    Artifact,
}

impl NodeType {
    /// Task action used when the node is scheduled into a wave
    pub fn action(self) -> &'static str {
        match self {
            NodeType::Constraint => "Discover and document",
            NodeType::Tension => "Analyze and resolve",
            NodeType::RequiredTruth => "Derive and validate",
            NodeType::Artifact => "Generate",
        }
    }

    /// Wave phase label when this type dominates a wave
    pub fn phase(self) -> &'static str {
        match self {
            NodeType::Constraint => "Discovery",
            NodeType::Tension => "Resolution",
            NodeType::RequiredTruth => "Derivation",
            NodeType::Artifact => "Generation",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Constraint => write!(f, "constraint"),
            NodeType::Tension => write!(f, "tension"),
            NodeType::RequiredTruth => write!(f, "required_truth"),
            NodeType::Artifact => write!(f, "artifact"),
        }
    }
}

/// Truth state of a node.
///
/// Transitions:
/// - `Required` | `Unknown` -> `Blocked` (at build time, while a dependency is unsatisfied)
/// - `Blocked` -> `Required` (when every dependency becomes satisfied)
/// - any -> `Satisfied` (verification evidence or an explicit mark)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    Unknown,
    Required,
    Satisfied,
    Blocked,
    Conflicted,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Unknown => write!(f, "UNKNOWN"),
            NodeStatus::Required => write!(f, "REQUIRED"),
            NodeStatus::Satisfied => write!(f, "SATISFIED"),
            NodeStatus::Blocked => write!(f, "BLOCKED"),
            NodeStatus::Conflicted => write!(f, "CONFLICTED"),
        }
    }
}

/// A node in the constraint graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    pub depends_on: Vec<String>,
    /// Reverse of `depends_on`, derived at build time
    pub blocks: Vec<String>,
    pub conflicts_with: Vec<String>,
    pub status: NodeStatus,
    pub critical_path: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_number: Option<usize>,
}

impl ConstraintNode {
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            depends_on: Vec::new(),
            blocks: Vec::new(),
            conflicts_with: Vec::new(),
            status: NodeStatus::Required,
            critical_path: false,
            wave_number: None,
        }
    }
}
