//! Intent inference and trajectory prediction for detected cars.
//!
//! Lateral velocity drives a hysteresis on each car's intent: a change is
//! only declared above [`LAT_VEL_LANE_CHANGE`] and only released once the
//! lateral motion has died back down. Each car then gets one predicted
//! trajectory per plausible intent over [`PRED_HORIZON`], weighted so the
//! probabilities sum to exactly 1.

use std::collections::BTreeMap;

use crate::algorithms::polynomial::{diff_poly, eval_poly, solve_jmt};
use crate::core::constants::{
    LANE_WIDTH, LAT_VEL_LANE_CHANGE, NUM_LANES, PRED_HORIZON, SIM_DT,
};
use crate::core::math::{lane_center_d, wrap_s};
use crate::core::types::{DetectedVehicle, Intent, Trajectory, VehState};
use crate::map::HighwayMap;

/// Advance a detected car's intent given its current lateral speed.
pub fn infer_intent(current: Intent, d_dot: f64) -> Intent {
    match current {
        Intent::KeepLane | Intent::Unknown => {
            if d_dot > LAT_VEL_LANE_CHANGE {
                Intent::LaneChangeRight
            } else if d_dot < -LAT_VEL_LANE_CHANGE {
                Intent::LaneChangeLeft
            } else {
                // First observation settles to lane keeping
                Intent::KeepLane
            }
        }
        Intent::LaneChangeRight => {
            if d_dot < LAT_VEL_LANE_CHANGE {
                Intent::KeepLane
            } else {
                Intent::LaneChangeRight
            }
        }
        Intent::LaneChangeLeft => {
            if d_dot > -LAT_VEL_LANE_CHANGE {
                Intent::KeepLane
            } else {
                Intent::LaneChangeLeft
            }
        }
        other => other,
    }
}

/// Update intents and predicted trajectories for every detected car.
pub fn predict_all(detected: &mut BTreeMap<i32, DetectedVehicle>, map: &HighwayMap) {
    for car in detected.values_mut() {
        let next = infer_intent(car.intent, car.state.d_dot);
        if next != car.intent {
            log::debug!(
                "car #{}: intent {} -> {}",
                car.id,
                car.intent.as_str(),
                next.as_str()
            );
        }
        car.intent = next;
        car.pred_trajs = predict_car(car, map);
    }
}

/// Predicted trajectories for one car, keyed by intent.
fn predict_car(car: &DetectedVehicle, map: &HighwayMap) -> BTreeMap<Intent, Trajectory> {
    let mut intents = vec![Intent::KeepLane];
    if car.lane > 1 {
        intents.push(Intent::LaneChangeLeft);
    }
    if car.lane < NUM_LANES {
        intents.push(Intent::LaneChangeRight);
    }
    if !intents.contains(&car.intent) {
        intents.push(car.intent);
    }

    let mut trajs: BTreeMap<Intent, Trajectory> = intents
        .iter()
        .filter_map(|&intent| predict_intent(car, intent, map).map(|t| (intent, t)))
        .collect();

    // The inferred intent takes 0.8, the alternatives share the rest
    let n = trajs.len();
    for (intent, traj) in trajs.iter_mut() {
        let p = if n == 1 {
            1.0
        } else if *intent == car.intent {
            0.8
        } else {
            0.2 / (n as f64 - 1.0)
        };
        traj.probability = Some(p);
    }
    trajs
}

/// One predicted trajectory for a specific intent hypothesis.
fn predict_intent(car: &DetectedVehicle, intent: Intent, map: &HighwayMap) -> Option<Trajectory> {
    let steps = (PRED_HORIZON / SIM_DT).round() as usize;
    let state = &car.state;
    let center = lane_center_d(car.lane);
    let s_max = map.s_max();

    let mut traj = Trajectory::new();
    match intent {
        Intent::LaneChangeLeft | Intent::LaneChangeRight => {
            let d_end = if intent == Intent::LaneChangeLeft {
                center - LANE_WIDTH
            } else {
                center + LANE_WIDTH
            };
            let coeffs_d = solve_jmt(
                &[state.d, state.d_dot, 0.0],
                &[d_end, 0.0, 0.0],
                PRED_HORIZON,
            )
            .ok()?;
            let coeffs_d_dot = diff_poly(&coeffs_d);
            let coeffs_d_ddot = diff_poly(&coeffs_d_dot);

            for i in 1..=steps {
                let t = i as f64 * SIM_DT;
                let s = wrap_s(state.s + state.s_dot * t, s_max);
                let d = eval_poly(t, &coeffs_d);
                let (x, y) = map.frenet_to_xy(s, d);
                traj.states.push(VehState {
                    x,
                    y,
                    s,
                    d,
                    s_dot: state.s_dot,
                    s_dotdot: 0.0,
                    d_dot: eval_poly(t, &coeffs_d_dot),
                    d_dotdot: eval_poly(t, &coeffs_d_ddot),
                });
            }
        }
        _ => {
            // Lane keeping drifts linearly back to the lane center
            let d_rate = (center - state.d) / PRED_HORIZON;
            for i in 1..=steps {
                let t = i as f64 * SIM_DT;
                let s = wrap_s(state.s + state.s_dot * t, s_max);
                let d = state.d + d_rate * t;
                let (x, y) = map.frenet_to_xy(s, d);
                traj.states.push(VehState {
                    x,
                    y,
                    s,
                    d,
                    s_dot: state.s_dot,
                    s_dotdot: 0.0,
                    d_dot: d_rate,
                    d_dotdot: 0.0,
                });
            }
        }
    }
    Some(traj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Waypoint;
    use approx::assert_relative_eq;

    fn straight_map(length: f64) -> HighwayMap {
        let mut waypoints = Vec::new();
        let mut s = 0.0;
        while s < length {
            waypoints.push(Waypoint {
                s,
                x: s,
                y: 0.0,
                dx: 0.0,
                dy: 1.0,
            });
            s += 25.0;
        }
        HighwayMap::from_waypoints(&waypoints, length)
    }

    fn car_with(lane: u8, d: f64, d_dot: f64) -> DetectedVehicle {
        let mut car = DetectedVehicle::new(9);
        car.update_state(VehState {
            x: 50.0,
            y: d,
            s: 50.0,
            d,
            s_dot: 18.0,
            d_dot,
            ..VehState::default()
        });
        assert_eq!(car.lane, lane);
        car
    }

    #[test]
    fn test_intent_hysteresis_engage() {
        assert_eq!(
            infer_intent(Intent::KeepLane, 2.5),
            Intent::LaneChangeRight
        );
        assert_eq!(infer_intent(Intent::KeepLane, -2.5), Intent::LaneChangeLeft);
        assert_eq!(infer_intent(Intent::Unknown, 2.5), Intent::LaneChangeRight);
        assert_eq!(infer_intent(Intent::KeepLane, 1.0), Intent::KeepLane);
        assert_eq!(infer_intent(Intent::Unknown, 0.0), Intent::KeepLane);
    }

    #[test]
    fn test_intent_hysteresis_release() {
        // Still moving right fast enough: hold the state
        assert_eq!(
            infer_intent(Intent::LaneChangeRight, 2.3),
            Intent::LaneChangeRight
        );
        // Lateral motion decayed: release
        assert_eq!(infer_intent(Intent::LaneChangeRight, 1.0), Intent::KeepLane);
        assert_eq!(infer_intent(Intent::LaneChangeLeft, -1.0), Intent::KeepLane);
        assert_eq!(
            infer_intent(Intent::LaneChangeLeft, -3.0),
            Intent::LaneChangeLeft
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let map = straight_map(500.0);
        for (lane, d) in [(1u8, 2.0), (2, 6.0), (3, 10.0)] {
            let mut detected = BTreeMap::new();
            detected.insert(9, car_with(lane, d, 0.0));
            predict_all(&mut detected, &map);

            let total: f64 = detected[&9]
                .pred_trajs
                .values()
                .map(|t| t.probability.unwrap())
                .sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_middle_lane_has_three_hypotheses() {
        let map = straight_map(500.0);
        let mut detected = BTreeMap::new();
        detected.insert(9, car_with(2, 6.0, 0.0));
        predict_all(&mut detected, &map);
        let trajs = &detected[&9].pred_trajs;
        assert_eq!(trajs.len(), 3);
        assert_relative_eq!(
            trajs[&Intent::KeepLane].probability.unwrap(),
            0.8,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            trajs[&Intent::LaneChangeLeft].probability.unwrap(),
            0.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_edge_lane_has_two_hypotheses() {
        let map = straight_map(500.0);
        let mut detected = BTreeMap::new();
        detected.insert(9, car_with(1, 2.0, 0.0));
        predict_all(&mut detected, &map);
        let trajs = &detected[&9].pred_trajs;
        assert_eq!(trajs.len(), 2);
        assert_relative_eq!(
            trajs[&Intent::LaneChangeRight].probability.unwrap(),
            0.2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_keep_lane_returns_to_center() {
        let map = straight_map(500.0);
        let mut detected = BTreeMap::new();
        // Slightly off-center in lane 2
        detected.insert(9, car_with(2, 6.8, 0.0));
        predict_all(&mut detected, &map);
        let traj = &detected[&9].pred_trajs[&Intent::KeepLane];
        let last = traj.last_state().unwrap();
        assert_relative_eq!(last.d, 6.0, epsilon = 0.01);
        assert_eq!(traj.len(), 150);
    }

    #[test]
    fn test_lane_change_reaches_adjacent_center() {
        let map = straight_map(500.0);
        let mut detected = BTreeMap::new();
        detected.insert(9, car_with(2, 6.0, -2.5));
        predict_all(&mut detected, &map);
        let car = &detected[&9];
        assert_eq!(car.intent, Intent::LaneChangeLeft);
        let traj = &car.pred_trajs[&Intent::LaneChangeLeft];
        let last = traj.last_state().unwrap();
        assert_relative_eq!(last.d, 2.0, epsilon = 1e-6);
        assert_relative_eq!(last.d_dot, 0.0, epsilon = 1e-6);
        // Longitudinal motion is constant speed
        assert_relative_eq!(last.s, 50.0 + 18.0 * 3.0, epsilon = 1e-6);
    }
}
