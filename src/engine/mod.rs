//! Orchestration layer: the per-frame planning cycle.

pub mod planner;

pub use planner::Planner;
