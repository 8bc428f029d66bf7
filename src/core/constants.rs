//! Road geometry and planner sampling constants.
//!
//! These are fixed properties of the three-lane highway and of the simulator
//! contract; everything an operator may want to tune at runtime lives in
//! [`crate::config`] instead.
//!
//! # Frenet convention
//!
//! `s` runs along the centerline and wraps at the map's loop length; `d` is
//! the lateral offset along the stored lane-normal vectors, increasing toward
//! the outer lane. Lanes are numbered 1..=3 from the innermost.

/// Simulator sample period in seconds. The simulator drives one emitted
/// waypoint per tick.
pub const SIM_DT: f64 = 0.02;

/// Lane width in meters.
pub const LANE_WIDTH: f64 = 4.0;

/// Number of lanes in the travel direction.
pub const NUM_LANES: u8 = 3;

/// Dense waypoint table spacing in meters after spline resampling.
pub const MAP_DS: f64 = 0.5;

/// Detected cars farther than this along `s` are ignored, in meters.
pub const SENSOR_RANGE: f64 = 100.0;

/// Prediction horizon for detected-car trajectories in seconds.
pub const PRED_HORIZON: f64 = 3.0;

/// Lateral speed above which a detected car is considered to be starting a
/// lane change, in m/s.
pub const LAT_VEL_LANE_CHANGE: f64 = 2.2;

/// Distance ahead at which speed shaping toward the leader begins, in meters.
pub const TGT_START_FOLLOW_DIST: f64 = 30.0;

/// Distance ahead at which the target speed equals the leader's, in meters.
pub const TGT_FOLLOW_DIST: f64 = 10.0;

/// Closer than this the target speed drops below the leader's, in meters.
pub const TGT_MIN_FOLLOW_DIST: f64 = 6.0;

/// Speed decrement under the leader when inside the minimum follow distance,
/// in m/s. Also sets the backup trajectory's speed reduction.
pub const MIN_FOLLOW_SPEED_DEC: f64 = 2.0;

/// Floor for the target speed to avoid stopping on the freeway, in m/s.
pub const TGT_MIN_SPEED: f64 = 4.5;

/// Speed decrement while hunting for a lane-change gap, in m/s.
pub const PLC_SPEED_DEC: f64 = 2.0;

/// Minimum clear gap to commit a lane change, in meters.
pub const LANE_CHANGE_MIN_GAP: f64 = 15.0;

/// Normalization reference for the closing speed of a faster car behind,
/// in m/s.
pub const REL_SPEED_BEHIND: f64 = 10.0;

/// Horizon of each newly planned trajectory in seconds.
pub const NEW_PATH_TIME: f64 = 2.5;

/// Portion of the previous plan preserved ahead of the simulator in seconds.
pub const PATH_BUFFER_TIME: f64 = 0.5;

/// Consecutive Cartesian samples closer than this are frozen to suppress
/// low-speed jitter, in meters.
pub const MIN_TRAJ_PT_DIST: f64 = 0.02;

/// Samples per averaging window for the acceleration feasibility check.
pub const ACCEL_WINDOW: usize = 10;

/// Speed margin subtracted when regenerating an over-speed candidate, in m/s.
pub const SPD_ADJ_OFFSET: f64 = 0.5;

/// Acceleration margin subtracted when regenerating an over-accel candidate,
/// in m/s².
pub const ACC_ADJ_OFFSET: f64 = 0.5;

/// Longitudinal half-extent of the collision box in meters.
pub const COLLISION_S_THRESH: f64 = 5.0;

/// Lateral half-extent of the collision box in meters.
pub const COLLISION_D_THRESH: f64 = 3.0;

/// Risk is evaluated at every k-th trajectory sample.
pub const EVAL_RISK_STEP: usize = 5;
