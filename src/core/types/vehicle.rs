//! Ego and detected vehicle records.

use std::collections::BTreeMap;

use super::intent::{BehaviorTarget, Intent};
use super::state::VehState;
use super::trajectory::Trajectory;

/// Common view over the ego and detected vehicles.
pub trait Vehicle {
    fn id(&self) -> i32;
    fn state(&self) -> &VehState;
    fn lane(&self) -> u8;
}

/// The controlled vehicle. Lives for the whole process.
#[derive(Debug, Clone)]
pub struct EgoVehicle {
    pub id: i32,
    pub lane: u8,
    pub state: VehState,
    /// The committed plan: buffered prefix plus the newest trajectory.
    pub traj: Trajectory,
    pub behavior: BehaviorTarget,
    /// Cooldown cycles remaining since the last lane-change decision.
    pub lane_change_counter: u32,
}

impl EgoVehicle {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            lane: 1,
            state: VehState::default(),
            traj: Trajectory::new(),
            behavior: BehaviorTarget::default(),
            lane_change_counter: 0,
        }
    }

    /// Refresh the kinematic state and the derived lane index.
    pub fn update_state(&mut self, state: VehState) {
        self.state = state;
        self.lane = state.lane();
    }
}

impl Vehicle for EgoVehicle {
    fn id(&self) -> i32 {
        self.id
    }
    fn state(&self) -> &VehState {
        &self.state
    }
    fn lane(&self) -> u8 {
        self.lane
    }
}

/// A vehicle reported by sensor fusion.
///
/// Exists only while present in the snapshot; dropped as soon as a frame
/// omits its id.
#[derive(Debug, Clone)]
pub struct DetectedVehicle {
    pub id: i32,
    pub lane: u8,
    pub state: VehState,
    /// Inferred lateral intent, kept across frames for hysteresis.
    pub intent: Intent,
    /// Signed shortest arc to the ego along `s`, positive ahead.
    pub s_rel: f64,
    /// Lateral offset relative to the ego.
    pub d_rel: f64,
    /// One predicted trajectory per plausible intent; probabilities sum to 1.
    pub pred_trajs: BTreeMap<Intent, Trajectory>,
}

impl DetectedVehicle {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            lane: 1,
            state: VehState::default(),
            intent: Intent::Unknown,
            s_rel: 0.0,
            d_rel: 0.0,
            pred_trajs: BTreeMap::new(),
        }
    }

    /// Refresh the kinematic state and the derived lane index.
    pub fn update_state(&mut self, state: VehState) {
        self.state = state;
        self.lane = state.lane();
    }

    /// Recompute the relative coordinates against a new ego state.
    pub fn update_rel(&mut self, ego: &VehState, s_max: f64) {
        self.s_rel = crate::core::math::arc_delta(self.state.s, ego.s, s_max);
        self.d_rel = self.state.d - ego.d;
    }
}

impl Vehicle for DetectedVehicle {
    fn id(&self) -> i32 {
        self.id
    }
    fn state(&self) -> &VehState {
        &self.state
    }
    fn lane(&self) -> u8 {
        self.lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ego_update_state_tracks_lane() {
        let mut ego = EgoVehicle::new(-1);
        ego.update_state(VehState {
            d: 9.8,
            ..VehState::default()
        });
        assert_eq!(ego.lane, 3);
    }

    #[test]
    fn test_detected_update_rel_across_seam() {
        let mut car = DetectedVehicle::new(7);
        car.update_state(VehState {
            s: 5.0,
            d: 6.0,
            ..VehState::default()
        });
        let ego = VehState {
            s: 495.0,
            d: 6.0,
            ..VehState::default()
        };
        car.update_rel(&ego, 500.0);
        assert_relative_eq!(car.s_rel, 10.0);
        assert_relative_eq!(car.d_rel, 0.0);
    }

    #[test]
    fn test_intent_survives_state_update() {
        let mut car = DetectedVehicle::new(3);
        car.intent = Intent::LaneChangeLeft;
        car.update_state(VehState {
            d: 2.0,
            ..VehState::default()
        });
        assert_eq!(car.intent, Intent::LaneChangeLeft);
        assert_eq!(car.lane, 1);
    }
}
