//! Configuration loading for Rajmarg
//!
//! All runtime-tunable planner parameters live here; fixed road geometry and
//! sampling constants are in [`crate::core::constants`].

use crate::error::{RajmargError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct RajmargConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
}

/// Simulator link settings
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkConfig {
    /// TCP listen port for the simulator connection (default: 4567)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Highway map source
#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    /// Path to the waypoint table (`s x y dx dy` per line)
    #[serde(default = "default_map_path")]
    pub path: String,
}

/// Kinematic limits and cycle timing
#[derive(Clone, Debug, Deserialize)]
pub struct LimitsConfig {
    /// Cruise target speed in m/s (default: 22.0, just under the 50 mph limit)
    #[serde(default = "default_target_speed")]
    pub target_speed: f64,

    /// Maximum longitudinal acceleration in m/s² (default: 9.0)
    #[serde(default = "default_max_accel")]
    pub max_accel: f64,

    /// Maximum jerk in m/s³ (default: 10.0)
    #[serde(default = "default_max_jerk")]
    pub max_jerk: f64,

    /// Minimum interval between replans in milliseconds (default: 100).
    /// Frames arriving faster are answered with the previous path.
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
}

/// Lane selection weights and hysteresis
#[derive(Clone, Debug, Deserialize)]
pub struct BehaviorConfig {
    /// Weight of the distance-to-car-ahead cost term
    #[serde(default = "default_w_dist_ahead")]
    pub w_dist_ahead: f64,

    /// Weight of the speed-of-car-ahead cost term
    #[serde(default = "default_w_speed_ahead")]
    pub w_speed_ahead: f64,

    /// Weight of the faster-car-behind cost term
    #[serde(default = "default_w_speed_behind")]
    pub w_speed_behind: f64,

    /// Weight of the lane-change distance cost term
    #[serde(default = "default_w_change")]
    pub w_change: f64,

    /// Weight applied per remaining cooldown cycle when leaving the
    /// current target lane
    #[serde(default = "default_w_frequent")]
    pub w_frequent: f64,

    /// Cooldown in planning cycles after a lane change (default: 150)
    #[serde(default = "default_lc_cooldown")]
    pub lc_cooldown: u32,
}

/// Candidate sampling and selection
#[derive(Clone, Debug, Deserialize)]
pub struct TrajectoryConfig {
    /// Number of candidate trajectories per cycle, base target included
    /// (default: 8)
    #[serde(default = "default_candidates")]
    pub candidates: usize,

    /// Std deviation of the slower-speed perturbation in m/s (default: 2.0)
    #[serde(default = "default_sigma_speed")]
    pub sigma_speed: f64,

    /// Std deviation of the longer-horizon perturbation in s (default: 0.5)
    #[serde(default = "default_sigma_time")]
    pub sigma_time: f64,

    /// Weight of the accumulated collision-risk cost term
    #[serde(default = "default_w_risk")]
    pub w_risk: f64,

    /// Weight of the deviation-from-target cost term
    #[serde(default = "default_w_deviation")]
    pub w_deviation: f64,

    /// Candidates costing more than this are discarded (default: 10.0)
    #[serde(default = "default_cost_threshold")]
    pub cost_threshold: f64,

    /// RNG seed for candidate sampling; omit for a per-process random seed
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default value functions
fn default_port() -> u16 {
    4567
}
fn default_map_path() -> String {
    "data/highway_map.txt".to_string()
}
fn default_target_speed() -> f64 {
    22.0
}
fn default_max_accel() -> f64 {
    9.0
}
fn default_max_jerk() -> f64 {
    10.0
}
fn default_cycle_ms() -> u64 {
    100
}
fn default_w_dist_ahead() -> f64 {
    1.0
}
fn default_w_speed_ahead() -> f64 {
    1.0
}
fn default_w_speed_behind() -> f64 {
    0.3
}
fn default_w_change() -> f64 {
    0.2
}
fn default_w_frequent() -> f64 {
    0.01
}
fn default_lc_cooldown() -> u32 {
    150
}
fn default_candidates() -> usize {
    8
}
fn default_sigma_speed() -> f64 {
    2.0
}
fn default_sigma_time() -> f64 {
    0.5
}
fn default_w_risk() -> f64 {
    100.0
}
fn default_w_deviation() -> f64 {
    1.0
}
fn default_cost_threshold() -> f64 {
    10.0
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            path: default_map_path(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            target_speed: default_target_speed(),
            max_accel: default_max_accel(),
            max_jerk: default_max_jerk(),
            cycle_ms: default_cycle_ms(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            w_dist_ahead: default_w_dist_ahead(),
            w_speed_ahead: default_w_speed_ahead(),
            w_speed_behind: default_w_speed_behind(),
            w_change: default_w_change(),
            w_frequent: default_w_frequent(),
            lc_cooldown: default_lc_cooldown(),
        }
    }
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            sigma_speed: default_sigma_speed(),
            sigma_time: default_sigma_time(),
            w_risk: default_w_risk(),
            w_deviation: default_w_deviation(),
            cost_threshold: default_cost_threshold(),
            seed: None,
        }
    }
}

impl Default for RajmargConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            map: MapConfig::default(),
            limits: LimitsConfig::default(),
            behavior: BehaviorConfig::default(),
            trajectory: TrajectoryConfig::default(),
        }
    }
}

impl RajmargConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RajmargError::Config(format!("Failed to read config file: {}", e)))?;
        let config: RajmargConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
