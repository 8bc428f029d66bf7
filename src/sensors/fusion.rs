//! Sensor-fusion update: ego reconstruction and the detected-car table.
//!
//! Runs first in every planning cycle. The ego state is re-anchored to the
//! unfinished tail of the previous plan so the Frenet derivatives stay
//! smooth across cycles; detected cars are rebuilt from the snapshot with
//! only their inferred intent carried over.

use std::collections::BTreeMap;

use crate::core::math::distance;
use crate::core::types::{DetectedVehicle, Trajectory, VehState};
use crate::map::HighwayMap;

/// One raw detection from the simulator's sensor-fusion array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Index of the previous-plan sample closest to the measured ego position.
///
/// Ties go to the latest sample: the anti-jitter filter can freeze a run of
/// identical points at low speed, and resuming from the last of them keeps
/// the plan moving forward. An empty plan locates at index 0.
pub fn locate_path_index(prev: &Trajectory, x: f64, y: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, state) in prev.states.iter().enumerate() {
        let dist = distance(x, y, state.x, state.y);
        if dist <= best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Rebuild the ego state from the previous plan's sample at `idx`.
///
/// The sample's Frenet derivatives are preserved; position is overridden
/// with the measured `(x, y)` and `(s, d)` recomputed from the map. With no
/// previous plan the state is measured position at rest.
pub fn reconstruct_ego_state(
    prev: &Trajectory,
    idx: usize,
    x: f64,
    y: f64,
    map: &HighwayMap,
) -> VehState {
    let (s, d) = map.xy_to_frenet(x, y);
    match prev.states.get(idx) {
        Some(base) => VehState {
            x,
            y,
            s,
            d,
            s_dot: base.s_dot,
            s_dotdot: base.s_dotdot,
            d_dot: base.d_dot,
            d_dotdot: base.d_dotdot,
        },
        None => VehState {
            x,
            y,
            s,
            d,
            ..VehState::default()
        },
    }
}

/// Fold a sensor snapshot into the detected-car table.
///
/// Known ids are updated in place (their intent survives for hysteresis),
/// new ids are inserted, and ids absent from this snapshot are dropped.
pub fn ingest(
    detected: &mut BTreeMap<i32, DetectedVehicle>,
    readings: &[SensorReading],
    ego: &VehState,
    map: &HighwayMap,
) {
    for reading in readings {
        let (s, d) = map.xy_to_frenet(reading.x, reading.y);
        let (s_dot, d_dot) = map.frenet_velocity(s, reading.vx, reading.vy);
        let state = VehState {
            x: reading.x,
            y: reading.y,
            s,
            d,
            s_dot,
            d_dot,
            s_dotdot: 0.0,
            d_dotdot: 0.0,
        };

        let car = detected
            .entry(reading.id)
            .or_insert_with(|| DetectedVehicle::new(reading.id));
        car.update_state(state);
        car.update_rel(ego, map.s_max());
    }

    detected.retain(|id, _| readings.iter().any(|r| r.id == *id));
}
