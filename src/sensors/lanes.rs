//! Per-lane index over the detected-car table.
//!
//! Rebuilt every cycle after ingest. Holds car ids, never references, so the
//! table stays the single owner of vehicle data.

use std::collections::BTreeMap;

use crate::core::constants::{NUM_LANES, SENSOR_RANGE};
use crate::core::types::DetectedVehicle;

/// Ids of in-range cars grouped by lane.
///
/// Within a lane the cars ahead come first in ascending `s_rel` (nearest
/// leader first), followed by the cars behind in descending `s_rel`
/// (nearest follower first).
#[derive(Debug, Clone, Default)]
pub struct LaneIndex {
    by_lane: BTreeMap<u8, Vec<i32>>,
}

impl LaneIndex {
    /// Build the index from the current detected-car table.
    pub fn build(detected: &BTreeMap<i32, DetectedVehicle>) -> Self {
        let mut by_lane = BTreeMap::new();
        for lane in 1..=NUM_LANES {
            let mut ahead: Vec<&DetectedVehicle> = detected
                .values()
                .filter(|car| car.lane == lane && car.s_rel.abs() <= SENSOR_RANGE)
                .filter(|car| car.s_rel > 0.0)
                .collect();
            let mut behind: Vec<&DetectedVehicle> = detected
                .values()
                .filter(|car| car.lane == lane && car.s_rel.abs() <= SENSOR_RANGE)
                .filter(|car| car.s_rel < 0.0)
                .collect();
            ahead.sort_by(|a, b| a.s_rel.total_cmp(&b.s_rel));
            behind.sort_by(|a, b| b.s_rel.total_cmp(&a.s_rel));

            let ids: Vec<i32> = ahead
                .into_iter()
                .chain(behind)
                .map(|car| car.id)
                .collect();
            by_lane.insert(lane, ids);
        }
        Self { by_lane }
    }

    /// Car ids in a lane, ordered ahead-first.
    pub fn ids_in_lane(&self, lane: u8) -> &[i32] {
        self.by_lane.get(&lane).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nearest car ahead of the ego in `lane`, as `(id, s_rel)`.
    pub fn nearest_front(
        &self,
        lane: u8,
        detected: &BTreeMap<i32, DetectedVehicle>,
    ) -> Option<(i32, f64)> {
        self.ids_in_lane(lane)
            .iter()
            .filter_map(|id| detected.get(id))
            .find(|car| car.s_rel > 0.0)
            .map(|car| (car.id, car.s_rel))
    }

    /// Nearest car behind the ego in `lane`, as `(id, s_rel)` with
    /// `s_rel < 0`.
    pub fn nearest_back(
        &self,
        lane: u8,
        detected: &BTreeMap<i32, DetectedVehicle>,
    ) -> Option<(i32, f64)> {
        self.ids_in_lane(lane)
            .iter()
            .filter_map(|id| detected.get(id))
            .find(|car| car.s_rel < 0.0)
            .map(|car| (car.id, car.s_rel))
    }
}
