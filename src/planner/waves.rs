//! Wave scheduling: repeatedly take every ready node

use std::collections::{BTreeSet, HashSet};

use crate::graph::{ConstraintGraph, ConstraintNode};

/// Which edge list a node waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Wait on `depends_on`
    Forward,
    /// Wait on `blocks`
    Backward,
}

impl Direction {
    pub fn prerequisites(self, node: &ConstraintNode) -> &[String] {
        match self {
            Direction::Forward => &node.depends_on,
            Direction::Backward => &node.blocks,
        }
    }
}

/// Group every node into ordered waves.
///
/// A node is ready once each prerequisite sits in an earlier wave or is not
/// in the graph at all. When nothing is ready but nodes remain, the
/// smallest remaining id is forced into its own wave, so this finishes in at
/// most one wave per node.
pub(super) fn schedule(graph: &ConstraintGraph, direction: Direction) -> Vec<Vec<String>> {
    let mut remaining: BTreeSet<&str> = graph.node_ids().collect();
    let mut scheduled: HashSet<&str> = HashSet::new();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let ready: Vec<&str> = remaining
            .iter()
            .copied()
            .filter(|id| {
                graph.get_node(id).is_some_and(|node| {
                    direction
                        .prerequisites(node)
                        .iter()
                        .all(|p| scheduled.contains(p.as_str()) || !graph.contains(p))
                })
            })
            .collect();

        let wave = if ready.is_empty() {
            let Some(&forced) = remaining.first() else {
                break;
            };
            tracing::warn!(
                forced,
                unresolved = ?remaining,
                "dependency cycle detected, forcing node into next wave"
            );
            vec![forced]
        } else {
            ready
        };

        for id in &wave {
            remaining.remove(id);
        }
        scheduled.extend(wave.iter().copied());
        waves.push(wave.into_iter().map(String::from).collect());
    }

    waves
}
