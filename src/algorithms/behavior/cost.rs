//! Lane selection by weighted cost.

use std::collections::BTreeMap;

use crate::config::BehaviorConfig;
use crate::core::constants::{NUM_LANES, REL_SPEED_BEHIND, SENSOR_RANGE, TGT_FOLLOW_DIST};
use crate::core::types::{DetectedVehicle, EgoVehicle};
use crate::sensors::LaneIndex;

/// Logarithmic normalization of `value` against `reference` into [0, 1].
///
/// Rises steeply for small values and saturates at the reference, so nearby
/// cars dominate the lane cost.
#[inline]
pub fn log_cost(value: f64, reference: f64) -> f64 {
    (1.0 + value.abs() / reference * (std::f64::consts::E - 1.0))
        .ln()
        .clamp(0.0, 1.0)
}

/// Cost of driving each lane, indexed by `lane - 1`.
pub fn lane_costs(
    ego: &EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    config: &BehaviorConfig,
    target_speed: f64,
) -> [f64; NUM_LANES as usize] {
    let mut costs = [0.0; NUM_LANES as usize];

    for lane in 1..=NUM_LANES {
        let mut cost = 0.0;

        // Distance to the car ahead: an empty lane costs nothing
        let front = lanes.nearest_front(lane, detected);
        let rel_s_ahead = front.map(|(_, s_rel)| s_rel).unwrap_or(SENSOR_RANGE);
        cost += config.w_dist_ahead * (1.0 - log_cost(rel_s_ahead, SENSOR_RANGE));

        // Speed of the car ahead
        let s_dot_ahead = front
            .and_then(|(id, _)| detected.get(&id))
            .map(|car| car.state.s_dot)
            .unwrap_or(target_speed);
        cost += config.w_speed_ahead * (1.0 - log_cost(s_dot_ahead, target_speed));

        // A faster car closing in from behind
        if let Some((id, s_rel)) = lanes.nearest_back(lane, detected) {
            if s_rel.abs() <= TGT_FOLLOW_DIST {
                if let Some(car) = detected.get(&id) {
                    let closing = (car.state.s_dot - ego.state.s_dot).max(0.0);
                    cost += config.w_speed_behind * log_cost(closing, REL_SPEED_BEHIND);
                }
            }
        }

        // Crossing lanes is work
        cost += config.w_change * (ego.lane as i32 - lane as i32).abs() as f64;

        // Re-deciding away from the current target during cooldown
        if ego.lane_change_counter > 0 && lane != ego.behavior.tgt_lane {
            cost += config.w_frequent * ego.lane_change_counter as f64;
        }

        costs[lane as usize - 1] = cost;
    }

    costs
}

/// Lowest-cost lane, ties to the lowest index, clamped to at most one lane
/// away from the ego's current lane.
pub fn best_lane(
    ego: &EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    config: &BehaviorConfig,
    target_speed: f64,
) -> u8 {
    let costs = lane_costs(ego, detected, lanes, config, target_speed);

    let mut best = 1u8;
    let mut best_cost = costs[0];
    for lane in 2..=NUM_LANES {
        let cost = costs[lane as usize - 1];
        if cost < best_cost {
            best = lane;
            best_cost = cost;
        }
    }
    log::trace!(
        "lane costs: {:?}, best lane {} (ego lane {})",
        costs,
        best,
        ego.lane
    );

    best.clamp(ego.lane.saturating_sub(1).max(1), (ego.lane + 1).min(NUM_LANES))
}
