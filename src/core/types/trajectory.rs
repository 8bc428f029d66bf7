//! Time-sampled vehicle trajectories.

use super::state::VehState;
use crate::core::constants::SIM_DT;
use serde::{Deserialize, Serialize};

/// A dense trajectory sampled at [`SIM_DT`].
///
/// Predicted trajectories carry a `probability`; candidate trajectories carry
/// a `cost`. Neither is set on the committed ego plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    /// Ordered samples, one per simulator tick.
    pub states: Vec<VehState>,

    /// Likelihood weight of a predicted trajectory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,

    /// Evaluated cost of a candidate trajectory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Trajectory {
    /// Empty trajectory with no weighting.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Last sample, if any.
    pub fn last_state(&self) -> Option<&VehState> {
        self.states.last()
    }

    /// Time span covered by the samples.
    pub fn duration(&self) -> f64 {
        self.states.len() as f64 * SIM_DT
    }

    /// Append all samples of `other` after this trajectory's samples.
    pub fn extend_from(&mut self, other: &Trajectory) {
        self.states.extend_from_slice(&other.states);
    }
}
