//! Requirements document schema type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of constraint statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Must hold at all times
    Invariant,
    /// Desired outcome
    #[default]
    Goal,
    /// Limit on what the feature may do
    Boundary,
    /// Anything the schema does not name
    #[serde(other)]
    Other,
}

/// Root of a requirements document.
///
/// Documents arrive pre-validated; every collection is optional so a
/// partially filled document still yields a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsDocument {
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub phase: String,
    /// Constraints grouped by category (e.g. "business", "technical")
    #[serde(default)]
    pub constraints: BTreeMap<String, Vec<Constraint>>,
    #[serde(default)]
    pub tensions: Vec<Tension>,
    #[serde(default)]
    pub required_truths: Vec<RequiredTruth>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Legacy free-text ordering annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_chain: Option<DependencyChain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ConstraintKind,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// A documented trade-off between two or more items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tension {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub between: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredTruth {
    pub id: String,
    #[serde(default)]
    pub statement: String,
    /// SATISFIED, PARTIAL, NOT_SATISFIED, SPECIFICATION_READY, ...
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub maps_to_constraints: Vec<String>,
}

/// A produced file and the requirements it fulfills
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub satisfies: Vec<String>,
    #[serde(default)]
    pub status: String,
}

/// Legacy ordering hints written as prose ("B1 before B2", "RT1 blocks RT2")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyChain {
    #[serde(default)]
    pub sequential: Vec<String>,
    #[serde(default)]
    pub blocking: Vec<String>,
}

/// Verification evidence attached to a document.
///
/// Per-item results take precedence over the coarse `overall_passed` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    #[serde(default)]
    pub overall_passed: Option<bool>,
    #[serde(default)]
    pub items: BTreeMap<String, VerificationOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    Passed,
    Failed,
}

impl RequirementsDocument {
    /// Iterate constraints together with their category name
    pub fn constraints_with_category(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.constraints
            .iter()
            .flat_map(|(category, items)| items.iter().map(move |c| (category.as_str(), c)))
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.values().map(Vec::len).sum()
    }
}
