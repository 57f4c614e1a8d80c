//! Incremental satisfaction tracking on an existing graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, WeftError};

use super::nodes::NodeStatus;
use super::ConstraintGraph;

/// How much of the graph is satisfied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub satisfied: usize,
    pub total: usize,
    /// 0-100, one decimal place
    pub percentage: f64,
}

impl Progress {
    pub fn of(graph: &ConstraintGraph) -> Self {
        let total = graph.node_count();
        let satisfied = graph
            .nodes()
            .filter(|n| n.status == NodeStatus::Satisfied)
            .count();
        let percentage = if total == 0 {
            0.0
        } else {
            (satisfied as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self {
            satisfied,
            total,
            percentage,
        }
    }
}

/// What changed after marking nodes satisfied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionDelta {
    /// Direct dependents whose every dependency is now satisfied
    pub unblocked: Vec<String>,
    /// Nodes that were not ready before the change and are ready now
    pub newly_ready: Vec<String>,
    pub progress: Progress,
}

/// Mark a node satisfied and report what it unblocked.
///
/// Calling this again for an already satisfied node returns empty deltas.
pub fn mark_satisfied(graph: &mut ConstraintGraph, id: &str) -> Result<SatisfactionDelta> {
    let node = graph
        .get_node(id)
        .ok_or_else(|| WeftError::NodeNotFound(id.to_string()))?;

    if node.status == NodeStatus::Satisfied {
        return Ok(SatisfactionDelta {
            unblocked: Vec::new(),
            newly_ready: Vec::new(),
            progress: Progress::of(graph),
        });
    }

    let dependents = node.blocks.clone();
    let ready_before: BTreeSet<String> = graph.ready_nodes().into_iter().collect();

    if let Some(node) = graph.get_node_mut(id) {
        node.status = NodeStatus::Satisfied;
    }

    let unblocked: Vec<String> = dependents
        .into_iter()
        .filter(|dependent| {
            graph.get_node(dependent).is_some_and(|n| {
                n.status != NodeStatus::Satisfied
                    && n.depends_on
                        .iter()
                        .all(|dep| graph.is_dependency_satisfied(dep))
            })
        })
        .collect();

    for dependent in &unblocked {
        if let Some(node) = graph.get_node_mut(dependent) {
            if node.status == NodeStatus::Blocked {
                node.status = NodeStatus::Required;
            }
        }
    }

    let newly_ready: Vec<String> = graph
        .ready_nodes()
        .into_iter()
        .filter(|ready| !ready_before.contains(ready))
        .collect();

    let progress = Progress::of(graph);
    tracing::debug!(
        id,
        unblocked = unblocked.len(),
        newly_ready = newly_ready.len(),
        satisfied = progress.satisfied,
        total = progress.total,
        "marked node satisfied"
    );

    Ok(SatisfactionDelta {
        unblocked,
        newly_ready,
        progress,
    })
}

/// Mark several nodes satisfied; the deltas are the deduplicated unions of
/// the per-node deltas.
///
/// Stops at the first unknown id; nodes marked before it stay satisfied.
pub fn mark_many_satisfied<S: AsRef<str>>(
    graph: &mut ConstraintGraph,
    ids: &[S],
) -> Result<SatisfactionDelta> {
    let mut unblocked = BTreeSet::new();
    let mut newly_ready = BTreeSet::new();

    for id in ids {
        let delta = mark_satisfied(graph, id.as_ref())?;
        unblocked.extend(delta.unblocked);
        newly_ready.extend(delta.newly_ready);
    }

    Ok(SatisfactionDelta {
        unblocked: unblocked.into_iter().collect(),
        newly_ready: newly_ready.into_iter().collect(),
        progress: Progress::of(graph),
    })
}
