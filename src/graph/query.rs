//! Forward and backward traversals over the constraint graph

use std::collections::{HashSet, VecDeque};

use super::nodes::ConstraintNode;
use super::ConstraintGraph;

/// Everything `target` transitively depends on, nearest first.
///
/// Dangling dependency ids are reported but not expanded. The target itself
/// is never part of the result, even inside a cycle.
pub fn what_must_be_true(graph: &ConstraintGraph, target: &str) -> Vec<String> {
    breadth_first(graph, target, |node| &node.depends_on)
}

/// Everything that transitively depends on `source`, nearest first
pub fn what_does_this_block(graph: &ConstraintGraph, source: &str) -> Vec<String> {
    breadth_first(graph, source, |node| &node.blocks)
}

/// Direct conflicts of a node (not transitive)
pub fn get_conflicts(graph: &ConstraintGraph, target: &str) -> Vec<String> {
    graph
        .get_node(target)
        .map(|n| n.conflicts_with.clone())
        .unwrap_or_default()
}

fn breadth_first<F>(graph: &ConstraintGraph, start: &str, neighbors: F) -> Vec<String>
where
    F: Fn(&ConstraintNode) -> &Vec<String>,
{
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut result = Vec::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(id) = queue.pop_front() {
        let Some(node) = graph.get_node(id) else {
            continue;
        };
        for next in neighbors(node) {
            if visited.insert(next.as_str()) {
                result.push(next.clone());
                queue.push_back(next.as_str());
            }
        }
    }

    result
}
