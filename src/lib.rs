//! Requirements constraint graph and wave-based execution planner.
//!
//! A requirements document (constraints, tensions, required truths and
//! generated artifacts) is turned into a [`graph::ConstraintGraph`], which
//! the [`planner`] schedules into parallel waves with a critical path.

pub mod cache;
pub mod config;
pub mod conflicts;
pub mod document;
pub mod error;
pub mod graph;
pub mod planner;

#[cfg(test)]
mod test_logs;

pub use cache::{Fingerprint, GraphCache};
pub use config::WeftConfig;
pub use conflicts::{detect_conflicts, detect_cross_document_conflicts};
pub use document::{load_document, parse_document, RequirementsDocument};
pub use error::{Result, WeftError};
pub use graph::{
    get_conflicts, mark_many_satisfied, mark_satisfied, what_does_this_block, what_must_be_true,
    ConstraintGraph, ConstraintNode, GraphBuilder, NodeStatus, NodeType, SatisfactionDelta,
};
pub use planner::{generate_execution_plan, ExecutionPlan, ParallelTask, Strategy, Wave};
