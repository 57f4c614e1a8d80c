//! Process-local memoization of built graphs and generated plans.
//!
//! One [`GraphCache`] is meant to live for the whole process and is passed
//! to whoever builds or plans; call [`GraphCache::clear`] to drop
//! everything. It is plain data with no interior locking, so a
//! multi-request host should keep it behind a `Mutex`.
//!
//! Entries are keyed by feature and validated with a [`Fingerprint`] made of
//! the feature, the phase and the item counts. Editing a statement without
//! adding or removing items keeps the fingerprint, so the cached graph is
//! served unchanged until [`GraphCache::remove`] or [`GraphCache::clear`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::RequirementsDocument;
use crate::error::{Result, WeftError};
use crate::graph::{self, ConstraintGraph, GraphBuilder, SatisfactionDelta};
use crate::planner::{generate_execution_plan, ExecutionPlan, Strategy};

/// Count-based cache key for one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub feature: String,
    pub phase: String,
    pub constraints: usize,
    pub tensions: usize,
    pub required_truths: usize,
    pub artifacts: usize,
}

impl Fingerprint {
    pub fn of(doc: &RequirementsDocument) -> Self {
        Self {
            feature: doc.feature.clone(),
            phase: doc.phase.clone(),
            constraints: doc.constraint_count(),
            tensions: doc.tensions.len(),
            required_truths: doc.required_truths.len(),
            artifacts: doc.artifacts.len(),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.feature,
            self.phase,
            self.constraints,
            self.tensions,
            self.required_truths,
            self.artifacts
        )
    }
}

struct CacheEntry {
    fingerprint: Fingerprint,
    graph: ConstraintGraph,
    plans: HashMap<Strategy, ExecutionPlan>,
}

/// Hit/miss counters, mostly useful in tests and debug output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub graph_hits: usize,
    pub graph_misses: usize,
    pub plan_hits: usize,
    pub plan_misses: usize,
}

#[derive(Default)]
pub struct GraphCache {
    builder: GraphBuilder,
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that builds graphs with a specific builder (e.g. with hints)
    pub fn with_builder(builder: GraphBuilder) -> Self {
        Self {
            builder,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Cached graph for the document's feature, rebuilt when stale
    pub fn graph(&mut self, doc: &RequirementsDocument) -> &ConstraintGraph {
        &lookup(&mut self.entries, &self.builder, &mut self.stats, doc).graph
    }

    /// Cached plan for (feature, strategy).
    ///
    /// A strategy that was never requested is planned fresh even when the
    /// graph itself is a cache hit.
    pub fn plan(&mut self, doc: &RequirementsDocument, strategy: Strategy) -> &ExecutionPlan {
        let entry = lookup(&mut self.entries, &self.builder, &mut self.stats, doc);

        if entry.plans.contains_key(&strategy) {
            self.stats.plan_hits += 1;
        } else {
            self.stats.plan_misses += 1;
            tracing::debug!(feature = %doc.feature, %strategy, "planning");
            let plan = generate_execution_plan(&entry.graph, strategy);
            entry.plans.insert(strategy, plan);
        }
        &entry.plans[&strategy]
    }

    /// Mark a node satisfied in the cached graph.
    ///
    /// Topology is unchanged, so only the feature's plans are dropped.
    pub fn mark_satisfied(&mut self, feature: &str, id: &str) -> Result<SatisfactionDelta> {
        let entry = self
            .entries
            .get_mut(feature)
            .ok_or_else(|| WeftError::UnknownFeature(feature.to_string()))?;

        let delta = graph::mark_satisfied(&mut entry.graph, id)?;
        entry.plans.clear();
        Ok(delta)
    }

    pub fn mark_many_satisfied<S: AsRef<str>>(
        &mut self,
        feature: &str,
        ids: &[S],
    ) -> Result<SatisfactionDelta> {
        let entry = self
            .entries
            .get_mut(feature)
            .ok_or_else(|| WeftError::UnknownFeature(feature.to_string()))?;

        let delta = graph::mark_many_satisfied(&mut entry.graph, ids);
        entry.plans.clear();
        delta
    }

    /// Cached graph without fingerprint validation
    pub fn cached_graph(&self, feature: &str) -> Option<&ConstraintGraph> {
        self.entries.get(feature).map(|e| &e.graph)
    }

    pub fn has_plan(&self, feature: &str, strategy: Strategy) -> bool {
        self.entries
            .get(feature)
            .is_some_and(|e| e.plans.contains_key(&strategy))
    }

    pub fn invalidate_plans(&mut self, feature: &str) {
        if let Some(entry) = self.entries.get_mut(feature) {
            entry.plans.clear();
        }
    }

    pub fn remove(&mut self, feature: &str) -> bool {
        self.entries.remove(feature).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Fetch the feature's entry, evicting it first when the fingerprint moved
fn lookup<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    builder: &GraphBuilder,
    stats: &mut CacheStats,
    doc: &RequirementsDocument,
) -> &'a mut CacheEntry {
    let fingerprint = Fingerprint::of(doc);

    let stale = entries
        .get(&doc.feature)
        .is_some_and(|e| e.fingerprint != fingerprint);
    if stale {
        tracing::debug!(feature = %doc.feature, %fingerprint, "fingerprint changed, evicting");
        entries.remove(&doc.feature);
    }

    if entries.contains_key(&doc.feature) {
        stats.graph_hits += 1;
    } else {
        stats.graph_misses += 1;
    }

    entries
        .entry(doc.feature.clone())
        .or_insert_with(|| CacheEntry {
            fingerprint,
            graph: builder.build(doc),
            plans: HashMap::new(),
        })
}
