//! Collision-risk accumulation against predicted traffic.

use std::collections::BTreeMap;

use crate::core::constants::{COLLISION_D_THRESH, COLLISION_S_THRESH, EVAL_RISK_STEP, SIM_DT};
use crate::core::math::arc_delta;
use crate::core::types::{DetectedVehicle, Trajectory};

/// Accumulated collision risk of a candidate trajectory.
///
/// Every [`EVAL_RISK_STEP`]-th candidate sample is compared against every
/// predicted trajectory of every detected car at the time-aligned index
/// `offset + i`, where `offset` is the length of the buffered prefix the
/// candidate will be appended after. An overlap inside the collision box
/// adds the prediction's probability, discounted exponentially with time so
/// imminent encounters dominate. Samples beyond a prediction's horizon
/// contribute nothing for that car.
pub fn collision_risk(
    traj: &Trajectory,
    detected: &BTreeMap<i32, DetectedVehicle>,
    offset: usize,
    s_max: f64,
) -> f64 {
    let mut risk_sum = 0.0;

    let mut i = 0;
    while i < traj.states.len() {
        let ego = &traj.states[i];
        for car in detected.values() {
            for pred in car.pred_trajs.values() {
                let Some(other) = pred.states.get(offset + i) else {
                    continue;
                };
                let ds = arc_delta(other.s, ego.s, s_max).abs();
                let dd = (other.d - ego.d).abs();
                if ds < COLLISION_S_THRESH && dd < COLLISION_D_THRESH {
                    let probability = pred.probability.unwrap_or(1.0);
                    risk_sum += probability * (-(i as f64) * SIM_DT).exp();
                }
            }
        }
        i += EVAL_RISK_STEP;
    }

    risk_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Intent, VehState};
    use approx::assert_relative_eq;

    fn straight_traj(s0: f64, s_dot: f64, d: f64, n: usize) -> Trajectory {
        let states = (1..=n)
            .map(|i| VehState {
                s: s0 + s_dot * i as f64 * SIM_DT,
                d,
                s_dot,
                ..VehState::default()
            })
            .collect();
        Trajectory {
            states,
            ..Trajectory::default()
        }
    }

    fn car_with_pred(s0: f64, s_dot: f64, d: f64, n: usize, p: f64) -> DetectedVehicle {
        let mut car = DetectedVehicle::new(1);
        let mut pred = straight_traj(s0, s_dot, d, n);
        pred.probability = Some(p);
        car.pred_trajs.insert(Intent::KeepLane, pred);
        car
    }

    #[test]
    fn test_no_traffic_no_risk() {
        let traj = straight_traj(0.0, 20.0, 6.0, 124);
        let detected = BTreeMap::new();
        assert_relative_eq!(collision_risk(&traj, &detected, 0, 6000.0), 0.0);
    }

    #[test]
    fn test_same_cell_accumulates_risk() {
        // Car exactly alongside the whole way
        let traj = straight_traj(0.0, 20.0, 6.0, 124);
        let mut detected = BTreeMap::new();
        detected.insert(1, car_with_pred(0.0, 20.0, 6.0, 150, 0.8));

        let risk = collision_risk(&traj, &detected, 0, 6000.0);
        assert!(risk > 0.8, "sustained overlap sums over samples: {}", risk);
    }

    #[test]
    fn test_lateral_separation_is_safe() {
        let traj = straight_traj(0.0, 20.0, 6.0, 124);
        let mut detected = BTreeMap::new();
        // Same s profile but a full lane away
        detected.insert(1, car_with_pred(0.0, 20.0, 10.0, 150, 1.0));
        assert_relative_eq!(collision_risk(&traj, &detected, 0, 6000.0), 0.0);
    }

    #[test]
    fn test_early_overlap_costs_more_than_late() {
        let mut detected_near = BTreeMap::new();
        detected_near.insert(1, car_with_pred(2.0, 20.0, 6.0, 150, 1.0));

        // Car starting 30 m ahead at the same speed never gets close;
        // one decelerating into the ego overlaps only late
        let traj = straight_traj(0.0, 20.0, 6.0, 124);
        let risk_near = collision_risk(&traj, &detected_near, 0, 6000.0);

        let mut late_pred = Trajectory::new();
        for i in 1..=150 {
            let t = i as f64 * SIM_DT;
            late_pred.states.push(VehState {
                s: 30.0 + 8.0 * t,
                d: 6.0,
                ..VehState::default()
            });
        }
        late_pred.probability = Some(1.0);
        let mut car = DetectedVehicle::new(2);
        car.pred_trajs.insert(Intent::KeepLane, late_pred);
        let mut detected_late = BTreeMap::new();
        detected_late.insert(2, car);
        let risk_late = collision_risk(&traj, &detected_late, 0, 6000.0);

        assert!(risk_near > risk_late);
    }

    #[test]
    fn test_offset_past_horizon_is_safe() {
        let traj = straight_traj(0.0, 20.0, 6.0, 124);
        let mut detected = BTreeMap::new();
        // Prediction shorter than the offset: nothing to compare against
        detected.insert(1, car_with_pred(0.0, 20.0, 6.0, 20, 1.0));
        assert_relative_eq!(collision_risk(&traj, &detected, 25, 6000.0), 0.0);
    }

    #[test]
    fn test_overlap_across_seam() {
        // Ego just before the loop seam, car just past it
        let traj = straight_traj(498.0, 20.0, 6.0, 50);
        let mut detected = BTreeMap::new();
        detected.insert(1, car_with_pred(499.0, 20.0, 6.0, 150, 1.0));
        let risk = collision_risk(&traj, &detected, 0, 500.0);
        assert!(risk > 0.0, "seam wrap must not hide the overlap");
    }
}
