//! Critical path: the longest dependency chain through the graph

use std::collections::{HashMap, HashSet};

use crate::graph::ConstraintGraph;

/// Dependencies-first ordering of every node.
///
/// DFS post-order over `depends_on`. Revisits are skipped silently, so a
/// cycle still yields an order (just not a valid topological one for the
/// nodes on the cycle). Dangling dependency ids are ignored.
pub fn topological_order(graph: &ConstraintGraph) -> Vec<&str> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(graph.node_count());

    for id in graph.node_ids() {
        visit(graph, id, &mut visited, &mut order);
    }

    order
}

fn visit<'a>(
    graph: &'a ConstraintGraph,
    id: &'a str,
    visited: &mut HashSet<&'a str>,
    order: &mut Vec<&'a str>,
) {
    let Some(node) = graph.get_node(id) else {
        return;
    };
    if !visited.insert(node.id.as_str()) {
        return;
    }
    for dep in &node.depends_on {
        visit(graph, dep, visited, order);
    }
    order.push(node.id.as_str());
}

/// Longest chain of `blocks` edges, listed from the foundation to the end.
///
/// Only edges pointing forward in [`topological_order`] are relaxed, which
/// keeps the predecessor chain acyclic even when the graph is not. Ties on
/// length go to the chain ending earliest in that order.
///
/// On a cyclic graph the result is still a valid chain but not necessarily
/// the longest one: an edge on the cycle that points backward in the DFS
/// order is dropped, together with any chain running through it. With
/// `A <-> B` and `C` depending on `B` the answer is `[B, A]`, not
/// `[A, B, C]`.
pub fn critical_path(graph: &ConstraintGraph) -> Vec<String> {
    let order = topological_order(graph);
    let position: HashMap<&str, usize> =
        order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut distance: HashMap<&str, usize> = order.iter().map(|id| (*id, 0)).collect();
    let mut predecessor: HashMap<&str, &str> = HashMap::new();

    for (i, &u) in order.iter().enumerate() {
        let Some(node) = graph.get_node(u) else {
            continue;
        };
        let du = distance.get(u).copied().unwrap_or(0);
        for v in &node.blocks {
            let Some(&pv) = position.get(v.as_str()) else {
                continue;
            };
            if pv <= i {
                continue;
            }
            if du + 1 > distance.get(v.as_str()).copied().unwrap_or(0) {
                distance.insert(v.as_str(), du + 1);
                predecessor.insert(v.as_str(), u);
            }
        }
    }

    let mut end: Option<(&str, usize)> = None;
    for &id in &order {
        let d = distance.get(id).copied().unwrap_or(0);
        let longer = match end {
            Some((_, best)) => d > best,
            None => true,
        };
        if longer {
            end = Some((id, d));
        }
    }

    let Some((mut current, _)) = end else {
        return Vec::new();
    };
    let mut path = vec![current.to_string()];
    while let Some(&prev) = predecessor.get(current) {
        path.push(prev.to_string());
        current = prev;
    }
    path.reverse();
    path
}
