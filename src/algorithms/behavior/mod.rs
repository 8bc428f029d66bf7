//! Behavior planning: lane selection, intent machine, speed, hysteresis.
//!
//! Runs once per cycle after prediction and fills in the ego's
//! [`BehaviorTarget`]. Order matters: the lane decision feeds the intent
//! machine, and the freshly decided intent feeds the speed selection.

pub mod cost;
pub mod fsm;
pub mod speed;

use std::collections::BTreeMap;

use crate::config::BehaviorConfig;
use crate::core::constants::NEW_PATH_TIME;
use crate::core::types::{DetectedVehicle, EgoVehicle, Intent};
use crate::sensors::LaneIndex;

pub use cost::{best_lane, lane_costs, log_cost};
pub use fsm::{next_intent, side_gap};
pub use speed::target_speed;

/// Decide this cycle's behavior target and update the lane-change counter.
pub fn plan(
    ego: &mut EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    config: &BehaviorConfig,
    cruise_speed: f64,
) {
    // First cycle: anchor the target to wherever the ego actually is
    if ego.behavior.intent == Intent::Unknown {
        ego.behavior.tgt_lane = ego.lane;
    }
    let prev_tgt_lane = ego.behavior.tgt_lane;

    let tgt_lane = best_lane(ego, detected, lanes, config, cruise_speed);

    let gap_left = side_gap(ego.lane as i32 - 1, detected, lanes);
    let gap_right = side_gap(ego.lane as i32 + 1, detected, lanes);
    let intent = next_intent(ego.behavior.intent, ego.lane, tgt_lane, gap_left, gap_right);

    let tgt_speed = target_speed(ego, detected, lanes, intent, tgt_lane, cruise_speed);

    ego.behavior.tgt_lane = tgt_lane;
    ego.behavior.intent = intent;
    ego.behavior.tgt_time = NEW_PATH_TIME;
    ego.behavior.tgt_speed = tgt_speed;

    ego.lane_change_counter = update_counter(
        ego.lane_change_counter,
        tgt_lane != prev_tgt_lane,
        intent,
        config.lc_cooldown,
    );

    log::debug!(
        "behavior: intent {} lane {}->{} speed {:.1} m/s counter {}",
        intent.as_str(),
        ego.lane,
        tgt_lane,
        tgt_speed,
        ego.lane_change_counter
    );
}

/// Decrement the cooldown, then reload it on any fresh lane decision or an
/// active change.
fn update_counter(counter: u32, tgt_lane_changed: bool, intent: Intent, cooldown: u32) -> u32 {
    let decremented = counter.saturating_sub(1);
    if tgt_lane_changed || intent.is_changing() {
        cooldown
    } else {
        decremented
    }
}
