//! Wave-based execution planning over a constraint graph
//!
//! Nodes are grouped into ordered waves: everything in a wave can be worked
//! on in parallel because its prerequisites were handled by earlier waves.
//! The planner itself runs synchronously; "parallel" describes the work it
//! hands out, not how it computes.

mod critical_path;
mod waves;


use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use crate::graph::{ConstraintGraph, NodeType};

pub use critical_path::{critical_path, topological_order};
pub use waves::Direction;

/// Phase label used when no node type has a strict plurality in a wave
pub const MIXED_PHASE: &str = "Mixed";

/// Which way the planner walks the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Foundations first: a node waits for everything it depends on
    #[default]
    Forward,
    /// Outcomes first: a node waits for everything it blocks
    Backward,
    /// Forward waves with critical-path nodes listed first in each wave
    Hybrid,
}

impl Strategy {
    fn direction(self) -> Direction {
        match self {
            Strategy::Backward => Direction::Backward,
            Strategy::Forward | Strategy::Hybrid => Direction::Forward,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Forward => write!(f, "forward"),
            Strategy::Backward => write!(f, "backward"),
            Strategy::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(Strategy::Forward),
            "backward" => Ok(Strategy::Backward),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(format!(
                "unknown strategy '{other}' (expected forward, backward or hybrid)"
            )),
        }
    }
}

/// One unit of work handed out in a wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelTask {
    pub id: String,
    pub node_ids: Vec<String>,
    pub action: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based
    pub number: usize,
    /// Cosmetic; the plurality node type of the wave
    pub phase: String,
    pub parallel_tasks: Vec<ParallelTask>,
    /// Prerequisites of this wave that earlier waves took care of
    pub blocking_dependencies: Vec<String>,
}

impl Wave {
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.parallel_tasks
            .iter()
            .flat_map(|t| t.node_ids.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub strategy: Strategy,
    pub waves: Vec<Wave>,
    pub critical_path: Vec<String>,
    /// nodes / waves, one decimal place; descriptive only
    pub parallelization_factor: f64,
}

impl ExecutionPlan {
    fn empty(strategy: Strategy) -> Self {
        Self {
            strategy,
            waves: Vec::new(),
            critical_path: Vec::new(),
            parallelization_factor: 0.0,
        }
    }

    /// Wave number a node was scheduled in
    pub fn wave_of(&self, id: &str) -> Option<usize> {
        self.waves
            .iter()
            .find(|w| w.node_ids().any(|n| n == id))
            .map(|w| w.number)
    }

    pub fn task_count(&self) -> usize {
        self.waves.iter().map(|w| w.parallel_tasks.len()).sum()
    }

    /// Write wave numbers and critical-path membership back onto the graph
    pub fn annotate(&self, graph: &mut ConstraintGraph) {
        for wave in &self.waves {
            for id in wave.node_ids() {
                if let Some(node) = graph.get_node_mut(id) {
                    node.wave_number = Some(wave.number);
                }
            }
        }
        for id in &self.critical_path {
            if let Some(node) = graph.get_node_mut(id) {
                node.critical_path = true;
            }
        }
    }
}

/// Schedule the graph into waves and compute its critical path.
///
/// Never fails: dangling dependencies count as satisfied and cycles are
/// broken by forcing one node forward (with a warning).
pub fn generate_execution_plan(graph: &ConstraintGraph, strategy: Strategy) -> ExecutionPlan {
    if graph.is_empty() {
        return ExecutionPlan::empty(strategy);
    }

    let direction = strategy.direction();
    let layers = waves::schedule(graph, direction);
    let critical_path = critical_path::critical_path(graph);
    let on_path: HashSet<&str> = critical_path.iter().map(String::as_str).collect();

    let wave_of: HashMap<&str, usize> = layers
        .iter()
        .enumerate()
        .flat_map(|(i, layer)| layer.iter().map(move |id| (id.as_str(), i)))
        .collect();

    let waves: Vec<Wave> = layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let mut ids: Vec<&str> = layer.iter().map(String::as_str).collect();
            if strategy == Strategy::Hybrid {
                ids.sort_by_key(|id| !on_path.contains(id));
            }
            build_wave(graph, direction, i, &ids, &wave_of)
        })
        .collect();

    let parallelization_factor = parallelization_factor(graph.node_count(), waves.len());

    tracing::info!(
        feature = %graph.feature,
        %strategy,
        waves = waves.len(),
        critical_path = critical_path.len(),
        parallelization_factor,
        "generated execution plan"
    );

    ExecutionPlan {
        strategy,
        waves,
        critical_path,
        parallelization_factor,
    }
}

fn build_wave(
    graph: &ConstraintGraph,
    direction: Direction,
    index: usize,
    ids: &[&str],
    wave_of: &HashMap<&str, usize>,
) -> Wave {
    let mut type_counts: HashMap<NodeType, usize> = HashMap::new();
    let mut blocking = BTreeSet::new();
    let mut parallel_tasks = Vec::with_capacity(ids.len());

    for id in ids {
        let Some(node) = graph.get_node(id) else {
            continue;
        };
        *type_counts.entry(node.node_type).or_default() += 1;

        for prereq in direction.prerequisites(node) {
            if wave_of.get(prereq.as_str()).is_some_and(|&w| w < index) {
                blocking.insert(prereq.clone());
            }
        }

        let action = node.node_type.action();
        parallel_tasks.push(ParallelTask {
            id: format!("task-{}", node.id),
            node_ids: vec![node.id.clone()],
            action: action.to_string(),
            description: format!("{action}: {}", node.label),
        });
    }

    Wave {
        number: index + 1,
        phase: phase_label(&type_counts).to_string(),
        parallel_tasks,
        blocking_dependencies: blocking.into_iter().collect(),
    }
}

/// Plurality node type of a wave; ties fall back to [`MIXED_PHASE`]
fn phase_label(type_counts: &HashMap<NodeType, usize>) -> &'static str {
    let Some(&max) = type_counts.values().max() else {
        return MIXED_PHASE;
    };
    let mut leaders = type_counts.iter().filter(|&(_, &count)| count == max);
    match (leaders.next(), leaders.next()) {
        (Some((node_type, _)), None) => node_type.phase(),
        _ => MIXED_PHASE,
    }
}

fn parallelization_factor(nodes: usize, waves: usize) -> f64 {
    if waves == 0 {
        return 0.0;
    }
    (nodes as f64 / waves as f64 * 10.0).round() / 10.0
}
