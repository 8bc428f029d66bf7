//! Target-speed selection.
//!
//! Starts from the cruise speed, shapes it down toward a leader in the
//! current lane, slows further while hunting for a lane-change gap, and
//! matches the destination leader during a committed change.

use std::collections::BTreeMap;

use crate::core::constants::{
    LANE_CHANGE_MIN_GAP, MIN_FOLLOW_SPEED_DEC, PLC_SPEED_DEC, TGT_FOLLOW_DIST,
    TGT_MIN_FOLLOW_DIST, TGT_MIN_SPEED, TGT_START_FOLLOW_DIST,
};
use crate::core::types::{DetectedVehicle, EgoVehicle, Intent};
use crate::sensors::LaneIndex;

/// Compute the behavior target speed for this cycle.
///
/// `intent` and `tgt_lane` are the freshly decided values; the decrements
/// below apply to the freshly computed follow base, never cumulatively.
pub fn target_speed(
    ego: &EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    intent: Intent,
    tgt_lane: u8,
    cruise_speed: f64,
) -> f64 {
    let mut speed = follow_base(ego, detected, lanes, cruise_speed);

    match intent {
        Intent::PlanLaneChangeLeft | Intent::PlanLaneChangeRight => {
            let check_lane = if intent == Intent::PlanLaneChangeLeft {
                ego.lane as i32 - 1
            } else {
                ego.lane as i32 + 1
            };
            if plc_blocked(ego, detected, lanes, check_lane) {
                speed -= PLC_SPEED_DEC;
            }
        }
        Intent::LaneChangeLeft | Intent::LaneChangeRight => {
            // Fall in behind the destination-lane leader while crossing over
            if let Some((id, s_rel)) = lanes.nearest_front(tgt_lane, detected) {
                if s_rel < TGT_START_FOLLOW_DIST {
                    if let Some(car) = detected.get(&id) {
                        speed = car.state.s_dot;
                    }
                }
            }
        }
        _ => {}
    }

    speed.clamp(TGT_MIN_SPEED, cruise_speed)
}

/// Follow-distance interpolation against the leader in the current lane.
fn follow_base(
    ego: &EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    cruise_speed: f64,
) -> f64 {
    let Some((id, rel_s)) = lanes.nearest_front(ego.lane, detected) else {
        return cruise_speed;
    };
    if rel_s >= TGT_START_FOLLOW_DIST {
        return cruise_speed;
    }
    let Some(leader) = detected.get(&id) else {
        return cruise_speed;
    };

    let spd_ahead = leader.state.s_dot;
    let slope = (spd_ahead - cruise_speed) / (TGT_FOLLOW_DIST - TGT_START_FOLLOW_DIST);
    let mut speed = slope * (rel_s - TGT_START_FOLLOW_DIST) + cruise_speed;

    if rel_s < TGT_MIN_FOLLOW_DIST {
        speed = spd_ahead - MIN_FOLLOW_SPEED_DEC;
    }

    speed.max(TGT_MIN_SPEED)
}

/// True when the ego is boxed in: a close leader ahead plus traffic in the
/// gap it wants on the chosen side.
fn plc_blocked(
    ego: &EgoVehicle,
    detected: &BTreeMap<i32, DetectedVehicle>,
    lanes: &LaneIndex,
    check_lane: i32,
) -> bool {
    if check_lane < 1 || check_lane > crate::core::constants::NUM_LANES as i32 {
        return false;
    }
    let check_lane = check_lane as u8;

    let close_ahead = lanes
        .nearest_front(ego.lane, detected)
        .is_some_and(|(_, s_rel)| s_rel < TGT_START_FOLLOW_DIST);
    let close_side_ahead = lanes
        .nearest_front(check_lane, detected)
        .is_some_and(|(_, s_rel)| s_rel < LANE_CHANGE_MIN_GAP);
    let close_side_behind = lanes
        .nearest_back(check_lane, detected)
        .is_some_and(|(_, s_rel)| s_rel.abs() < LANE_CHANGE_MIN_GAP);

    close_ahead && (close_side_ahead || close_side_behind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::lane_center_d;
    use crate::core::types::VehState;
    use approx::assert_relative_eq;

    const CRUISE: f64 = 22.0;

    fn ego_in_lane(lane: u8, s_dot: f64) -> EgoVehicle {
        let mut ego = EgoVehicle::new(-1);
        ego.update_state(VehState {
            s: 100.0,
            d: lane_center_d(lane),
            s_dot,
            ..VehState::default()
        });
        ego
    }

    fn car(id: i32, lane: u8, s_rel: f64, s_dot: f64) -> DetectedVehicle {
        let mut c = DetectedVehicle::new(id);
        c.lane = lane;
        c.s_rel = s_rel;
        c.state = VehState {
            s_dot,
            d: lane_center_d(lane),
            ..VehState::default()
        };
        c
    }

    fn table(cars: Vec<DetectedVehicle>) -> BTreeMap<i32, DetectedVehicle> {
        cars.into_iter().map(|c| (c.id, c)).collect()
    }

    #[test]
    fn test_open_road_cruises() {
        let ego = ego_in_lane(2, 20.0);
        let detected = BTreeMap::new();
        let lanes = LaneIndex::build(&detected);
        let speed = target_speed(&ego, &detected, &lanes, Intent::KeepLane, 2, CRUISE);
        assert_relative_eq!(speed, CRUISE);
    }

    #[test]
    fn test_follow_interpolation_endpoints() {
        let ego = ego_in_lane(2, 20.0);
        let lanes_at = |rel: f64| {
            let detected = table(vec![car(7, 2, rel, 10.0)]);
            let lanes = LaneIndex::build(&detected);
            target_speed(&ego, &detected, &lanes, Intent::KeepLane, 2, CRUISE)
        };

        // At the follow-start distance the cruise speed still holds
        assert_relative_eq!(lanes_at(30.0), CRUISE);
        // Half way through the band: half way between the speeds
        assert_relative_eq!(lanes_at(20.0), (CRUISE + 10.0) / 2.0, epsilon = 1e-9);
        // At the follow distance the leader's speed is matched
        assert_relative_eq!(lanes_at(10.0), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_close_backs_off_below_leader() {
        let ego = ego_in_lane(2, 12.0);
        let detected = table(vec![car(7, 2, 5.0, 10.0)]);
        let lanes = LaneIndex::build(&detected);
        let speed = target_speed(&ego, &detected, &lanes, Intent::KeepLane, 2, CRUISE);
        assert_relative_eq!(speed, 10.0 - MIN_FOLLOW_SPEED_DEC);
    }

    #[test]
    fn test_speed_floor() {
        let ego = ego_in_lane(2, 5.0);
        // Nearly stopped leader very close ahead
        let detected = table(vec![car(7, 2, 4.0, 1.0)]);
        let lanes = LaneIndex::build(&detected);
        let speed = target_speed(&ego, &detected, &lanes, Intent::KeepLane, 2, CRUISE);
        assert_relative_eq!(speed, TGT_MIN_SPEED);
    }

    #[test]
    fn test_plc_decrement_when_boxed_in() {
        let ego = ego_in_lane(2, 18.0);
        // Slow leader ahead plus a car sitting in the left gap
        let detected = table(vec![car(7, 2, 25.0, 8.0), car(8, 1, 5.0, CRUISE)]);
        let lanes = LaneIndex::build(&detected);

        let base = {
            let detected_base = table(vec![car(7, 2, 25.0, 8.0)]);
            let lanes_base = LaneIndex::build(&detected_base);
            target_speed(
                &ego,
                &detected_base,
                &lanes_base,
                Intent::KeepLane,
                2,
                CRUISE,
            )
        };
        let speed = target_speed(
            &ego,
            &detected,
            &lanes,
            Intent::PlanLaneChangeLeft,
            1,
            CRUISE,
        );
        assert_relative_eq!(speed, base - PLC_SPEED_DEC, epsilon = 1e-9);
    }

    #[test]
    fn test_plc_no_decrement_with_open_side() {
        let ego = ego_in_lane(2, 18.0);
        let detected = table(vec![car(7, 2, 25.0, 8.0)]);
        let lanes = LaneIndex::build(&detected);
        let with_plan = target_speed(
            &ego,
            &detected,
            &lanes,
            Intent::PlanLaneChangeLeft,
            1,
            CRUISE,
        );
        let keeping = target_speed(&ego, &detected, &lanes, Intent::KeepLane, 2, CRUISE);
        assert_relative_eq!(with_plan, keeping);
    }

    #[test]
    fn test_lane_change_matches_destination_leader() {
        let ego = ego_in_lane(2, 20.0);
        let detected = table(vec![car(9, 1, 20.0, 14.0)]);
        let lanes = LaneIndex::build(&detected);
        let speed = target_speed(
            &ego,
            &detected,
            &lanes,
            Intent::LaneChangeLeft,
            1,
            CRUISE,
        );
        assert_relative_eq!(speed, 14.0);
    }
}
