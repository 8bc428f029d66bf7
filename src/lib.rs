//! Rajmarg - Highway motion planner
//!
//! Turns telemetry frames from a driving simulator into dense, time-sampled
//! Cartesian paths that keep the vehicle inside its three-lane corridor,
//! within speed/acceleration limits, clear of traffic, and opportunistically
//! in the fastest lane.
//!
//! # Architecture
//!
//! The crate is organized into 6 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Simulator link
//! │              (messages, TCP server)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │               (per-frame planner cycle)             │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │    (polynomial, prediction, behavior, trajectory)   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Telemetry ingest
//! │              (fusion, lane grouping)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     map/                            │  ← Road frame
//! │            (splines, Frenet conversions)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │             (constants, math, types)                │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline
//!
//! Every telemetry frame flows strictly forward through one cycle:
//!
//! 1. **State reconstruction** - re-anchor the ego on the unfinished tail of
//!    the previous plan, fold the sensor snapshot into the detected-car table
//! 2. **Prediction** - infer each car's lateral intent with hysteresis and
//!    roll out weighted trajectories per plausible intent
//! 3. **Behavior** - pick the cheapest lane, step the intent machine, shape
//!    the target speed, update the lane-change cooldown
//! 4. **Trajectory** - sample jerk-minimising candidates in Frenet, check
//!    feasibility in Cartesian, score risk against predictions, pick the
//!    winner and append it after the buffered prefix

pub mod config;
pub mod error;

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Highway map (depends on core)
// ============================================================================
pub mod map;

// ============================================================================
// Layer 3: Sensor processing (depends on core, map)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 4: Algorithms (depends on core, map, sensors)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 5: Planning engine (depends on all lower layers)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 6: I/O infrastructure
// ============================================================================
pub mod io;

// Convenience re-exports (flat namespace for common use)
pub use crate::core::types::{
    BehaviorTarget, DetectedVehicle, EgoVehicle, Intent, Trajectory, VehState,
};
pub use config::RajmargConfig;
pub use engine::Planner;
pub use error::{RajmargError, Result};
pub use io::{PathMessage, TelemetryFrame, TelemetryServer};
pub use map::{HighwayMap, Waypoint};
