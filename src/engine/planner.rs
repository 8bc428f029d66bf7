//! The per-frame planning cycle.
//!
//! [`Planner`] owns all cross-cycle state: the ego record (with its
//! committed plan), the detected-car table and the sampling RNG. One call to
//! [`Planner::handle_frame`] runs the whole pipeline in order — reconstruct,
//! predict, behave, generate — and returns the path to emit. The pipeline is
//! single-threaded by design: nothing outside this struct mutates planning
//! state.

use std::collections::BTreeMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::algorithms::{behavior, prediction, trajectory};
use crate::config::RajmargConfig;
use crate::core::constants::{PATH_BUFFER_TIME, SENSOR_RANGE, SIM_DT};
use crate::core::types::{DetectedVehicle, EgoVehicle, Trajectory};
use crate::io::messages::{PathMessage, TelemetryFrame};
use crate::map::HighwayMap;
use crate::sensors::{fusion, LaneIndex, SensorReading};

/// Highway planner state machine, one instance per process.
pub struct Planner {
    config: RajmargConfig,
    map: HighwayMap,
    ego: EgoVehicle,
    detected: BTreeMap<i32, DetectedVehicle>,
    rng: StdRng,
    last_plan: Option<Instant>,
    cycle: u64,
}

impl Planner {
    pub fn new(config: RajmargConfig, map: HighwayMap) -> Self {
        let rng = match config.trajectory.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            map,
            ego: EgoVehicle::new(-1),
            detected: BTreeMap::new(),
            rng,
            last_plan: None,
            cycle: 0,
        }
    }

    /// The currently committed plan, for rebroadcast on malformed frames.
    pub fn previous_path(&self) -> PathMessage {
        Self::path_from(&self.ego.traj)
    }

    /// Run one planning cycle for a telemetry frame.
    ///
    /// Frames arriving faster than the configured cycle time are coalesced:
    /// the frame's own previous path is echoed back unchanged so the
    /// simulator keeps driving the committed plan.
    pub fn handle_frame(&mut self, frame: &TelemetryFrame) -> PathMessage {
        if let Some(last) = self.last_plan {
            if (last.elapsed().as_millis() as u64) < self.config.limits.cycle_ms {
                return PathMessage {
                    next_x: frame.previous_path.x.clone(),
                    next_y: frame.previous_path.y.clone(),
                };
            }
        }
        let started = Instant::now();
        self.last_plan = Some(started);
        self.cycle += 1;

        // Sensor fusion: re-anchor the ego on the previous plan, rebuild the
        // detected-car table
        let prev_traj = std::mem::take(&mut self.ego.traj);
        let idx = fusion::locate_path_index(&prev_traj, frame.x, frame.y);
        let ego_state =
            fusion::reconstruct_ego_state(&prev_traj, idx, frame.x, frame.y, &self.map);
        self.ego.update_state(ego_state);

        let readings: Vec<SensorReading> =
            frame.sensor_fusion.iter().map(|row| row.reading()).collect();
        fusion::ingest(&mut self.detected, &readings, &self.ego.state, &self.map);
        let lanes = LaneIndex::build(&self.detected);

        // Prediction
        prediction::predict_all(&mut self.detected, &self.map);

        // Behavior
        behavior::plan(
            &mut self.ego,
            &self.detected,
            &lanes,
            &self.config.behavior,
            self.config.limits.target_speed,
        );

        // Trajectory: preserve the in-flight buffer, then plan onward from
        // its tail
        let buffer = buffer_trajectory(idx, &prev_traj);
        let start = buffer.last_state().copied().unwrap_or(self.ego.state);
        let new_traj = trajectory::generate(
            &start,
            &self.ego.behavior,
            self.ego.lane,
            &self.detected,
            buffer.len(),
            &self.map,
            &self.config.trajectory,
            &self.config.limits,
            &mut self.rng,
        );

        self.ego.traj = buffer;
        match new_traj {
            Some(traj) => self.ego.traj.extend_from(&traj),
            None => {
                log::error!("cycle {}: no trajectory produced", self.cycle);
                if self.ego.traj.is_empty() {
                    // Never emit an empty path while a plan exists
                    self.ego.traj = prev_traj;
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if elapsed_ms > self.config.limits.cycle_ms && self.config.limits.cycle_ms > 0 {
            log::warn!(
                "cycle {} took {} ms, over the {} ms cycle time",
                self.cycle,
                elapsed_ms,
                self.config.limits.cycle_ms
            );
        }
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "cycle {} done in {} ms\n{}",
                self.cycle,
                elapsed_ms,
                road_diagram(&self.detected, &self.ego)
            );
        }

        Self::path_from(&self.ego.traj)
    }

    fn path_from(traj: &Trajectory) -> PathMessage {
        PathMessage {
            next_x: traj.states.iter().map(|s| s.x).collect(),
            next_y: traj.states.iter().map(|s| s.y).collect(),
        }
    }

    /// Read access to the ego record for diagnostics.
    pub fn ego(&self) -> &EgoVehicle {
        &self.ego
    }

    /// Read access to the detected-car table for diagnostics.
    pub fn detected(&self) -> &BTreeMap<i32, DetectedVehicle> {
        &self.detected
    }
}

/// The still-unconsumed samples strictly after the located index, capped at
/// the buffer horizon. An untouched plan (index 0) keeps nothing so the
/// first cycle starts fresh from the measured state.
fn buffer_trajectory(idx: usize, prev: &Trajectory) -> Trajectory {
    let mut buffer = Trajectory::new();
    if idx > 0 {
        let buffer_pts = (PATH_BUFFER_TIME / SIM_DT).round() as usize;
        let from = idx + 1;
        let to = (from + buffer_pts).min(prev.len());
        if from < to {
            buffer.states.extend_from_slice(&prev.states[from..to]);
        }
    }
    buffer
}

/// ASCII rendering of the corridor around the ego for debug logs.
fn road_diagram(detected: &BTreeMap<i32, DetectedVehicle>, ego: &EgoVehicle) -> String {
    let mut out = String::new();
    let mut row_s = SENSOR_RANGE;
    while row_s > -SENSOR_RANGE {
        for lane in 1..=crate::core::constants::NUM_LANES {
            out.push('|');
            let mut mark = String::from("  ");
            if row_s == 0.0 && lane == ego.lane {
                mark = String::from("@@");
            } else {
                for car in detected.values() {
                    if car.lane == lane && car.s_rel <= row_s + 4.0 && car.s_rel > row_s - 6.0 {
                        mark = format!("{:02}", car.id.rem_euclid(100));
                    }
                }
            }
            out.push_str(&mark);
        }
        out.push_str("|\n");
        row_s -= 10.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RajmargConfig;
    use crate::core::math::lane_center_d;
    use crate::io::messages::{PreviousPath, SensorFusionRow};
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

    fn test_config() -> RajmargConfig {
        let mut config = RajmargConfig::default();
        config.limits.cycle_ms = 0; // plan on every frame under test
        config.trajectory.seed = Some(99);
        config
    }

    fn frame_at(x: f64, y: f64) -> TelemetryFrame {
        TelemetryFrame {
            x,
            y,
            previous_path: PreviousPath::default(),
            sensor_fusion: Vec::new(),
        }
    }

    #[test]
    fn test_first_cycle_emits_forward_path() {
        let mut planner = Planner::new(test_config(), straight_map(3000.0));
        let path = planner.handle_frame(&frame_at(0.0, lane_center_d(2)));

        assert!(!path.next_x.is_empty());
        assert_eq!(path.next_x.len(), path.next_y.len());
        // Moves forward along the track
        assert!(path.next_x.last().unwrap() > &0.0);
        // Stays inside the corridor
        for y in &path.next_y {
            assert!(*y > 0.0 && *y < 12.0, "left the corridor: y = {}", y);
        }
    }

    #[test]
    fn test_buffer_trajectory_bounds() {
        let states = (0..100)
            .map(|i| crate::core::types::VehState {
                x: i as f64,
                ..Default::default()
            })
            .collect();
        let prev = Trajectory {
            states,
            ..Trajectory::default()
        };

        // Index 0 keeps nothing
        assert!(buffer_trajectory(0, &prev).is_empty());

        // Mid-plan keeps at most the buffer horizon, strictly after idx
        let buffer = buffer_trajectory(10, &prev);
        assert_eq!(buffer.len(), 25);
        assert_relative_eq!(buffer.states[0].x, 11.0);

        // Near the end, the remainder is shorter than the horizon
        let buffer = buffer_trajectory(95, &prev);
        assert_eq!(buffer.len(), 4);

        // Past the end keeps nothing
        assert!(buffer_trajectory(99, &prev).is_empty());
    }

    #[test]
    fn test_continuity_across_cycles() {
        let mut planner = Planner::new(test_config(), straight_map(3000.0));

        // Drive the closed loop out of the standing start first; at speed,
        // the consumed sample is unambiguous
        let consumed = 5;
        let mut path = planner.handle_frame(&frame_at(0.0, lane_center_d(2)));
        for _ in 0..15 {
            path = planner.handle_frame(&frame_at(
                path.next_x[consumed - 1],
                path.next_y[consumed - 1],
            ));
        }

        let first = path.clone();
        let second = planner.handle_frame(&frame_at(
            first.next_x[consumed - 1],
            first.next_y[consumed - 1],
        ));

        // The buffered prefix of the new path replays the previous plan
        let buffer_pts = (PATH_BUFFER_TIME / SIM_DT).round() as usize;
        for i in 0..buffer_pts.min(second.next_x.len()) {
            assert_relative_eq!(second.next_x[i], first.next_x[consumed + i], epsilon = 1e-12);
            assert_relative_eq!(second.next_y[i], first.next_y[consumed + i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coalescing_echoes_previous_path() {
        let mut config = test_config();
        config.limits.cycle_ms = 60_000;
        let mut planner = Planner::new(config, straight_map(3000.0));

        let first = planner.handle_frame(&frame_at(0.0, lane_center_d(2)));
        assert!(!first.next_x.is_empty());

        // An immediate second frame is answered with its own previous path
        let mut fast_frame = frame_at(first.next_x[0], first.next_y[0]);
        fast_frame.previous_path = PreviousPath {
            x: first.next_x[1..].to_vec(),
            y: first.next_y[1..].to_vec(),
        };
        let echoed = planner.handle_frame(&fast_frame);
        assert_eq!(echoed.next_x, fast_frame.previous_path.x);
        assert_eq!(echoed.next_y, fast_frame.previous_path.y);
    }

    #[test]
    fn test_detected_cars_tracked_and_dropped() {
        let mut planner = Planner::new(test_config(), straight_map(3000.0));
        let mut frame = frame_at(0.0, lane_center_d(2));
        frame.sensor_fusion.push(SensorFusionRow {
            id: 7,
            x: 30.0,
            y: lane_center_d(2),
            vx: 10.0,
            vy: 0.0,
            s: 30.0,
            d: lane_center_d(2),
        });
        planner.handle_frame(&frame);
        assert_eq!(planner.detected.len(), 1);
        assert!(planner.detected[&7].pred_trajs.len() >= 2);

        // Car disappears from the snapshot: entry dropped
        planner.handle_frame(&frame_at(1.0, lane_center_d(2)));
        assert!(planner.detected.is_empty());
    }

    #[test]
    fn test_previous_path_matches_last_emission() {
        let mut planner = Planner::new(test_config(), straight_map(3000.0));
        let emitted = planner.handle_frame(&frame_at(0.0, lane_center_d(2)));
        assert_eq!(planner.previous_path(), emitted);
    }
}
