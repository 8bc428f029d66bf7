//! The five-state intent machine.
//!
//! Lane selection proposes a target lane; this machine decides how to get
//! there. A change is planned until the side gap opens past
//! [`LANE_CHANGE_MIN_GAP`], committed while the target stays on that side
//! and the gap holds, and released back to lane keeping otherwise.

use std::collections::BTreeMap;

use crate::core::constants::{LANE_CHANGE_MIN_GAP, NUM_LANES};
use crate::core::types::{DetectedVehicle, Intent};
use crate::sensors::LaneIndex;

/// Clear space around the ego in an adjacent lane: the smaller of the
/// nearest-ahead and nearest-behind arc distances. Infinite when the lane is
/// empty or does not exist.
pub fn side_gap(
    lane: i32,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
) -> f64 {
    if lane < 1 || lane > NUM_LANES as i32 {
        return f64::INFINITY;
    }
    let lane = lane as u8;
    let front = lanes
        .nearest_front(lane, detected)
        .map(|(_, s_rel)| s_rel.abs())
        .unwrap_or(f64::INFINITY);
    let back = lanes
        .nearest_back(lane, detected)
        .map(|(_, s_rel)| s_rel.abs())
        .unwrap_or(f64::INFINITY);
    front.min(back)
}

/// Advance the intent machine one cycle.
///
/// `gap_left`/`gap_right` are the side gaps in the adjacent lanes.
pub fn next_intent(
    prev: Intent,
    ego_lane: u8,
    tgt_lane: u8,
    gap_left: f64,
    gap_right: f64,
) -> Intent {
    match prev {
        Intent::KeepLane | Intent::Unknown => {
            if tgt_lane < ego_lane {
                Intent::PlanLaneChangeLeft
            } else if tgt_lane > ego_lane {
                Intent::PlanLaneChangeRight
            } else {
                Intent::KeepLane
            }
        }
        Intent::PlanLaneChangeLeft => {
            if tgt_lane >= ego_lane {
                Intent::KeepLane
            } else if gap_left > LANE_CHANGE_MIN_GAP {
                Intent::LaneChangeLeft
            } else {
                Intent::PlanLaneChangeLeft
            }
        }
        Intent::PlanLaneChangeRight => {
            if tgt_lane <= ego_lane {
                Intent::KeepLane
            } else if gap_right > LANE_CHANGE_MIN_GAP {
                Intent::LaneChangeRight
            } else {
                Intent::PlanLaneChangeRight
            }
        }
        Intent::LaneChangeLeft => {
            if tgt_lane < ego_lane && gap_left > LANE_CHANGE_MIN_GAP {
                Intent::LaneChangeLeft
            } else {
                Intent::KeepLane
            }
        }
        Intent::LaneChangeRight => {
            if tgt_lane > ego_lane && gap_right > LANE_CHANGE_MIN_GAP {
                Intent::LaneChangeRight
            } else {
                Intent::KeepLane
            }
        }
    }
}
