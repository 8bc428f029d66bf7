//! Kinematic snapshot of a vehicle.

use serde::{Deserialize, Serialize};

/// Full kinematic state of a vehicle at one instant.
///
/// Position is carried in both frames; derivatives exist in the Frenet frame
/// only. `s` is stored wrapped into `[0, s_max)` of the owning map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehState {
    /// Cartesian x in meters
    pub x: f64,
    /// Cartesian y in meters
    pub y: f64,
    /// Longitudinal Frenet coordinate in meters
    pub s: f64,
    /// Longitudinal speed in m/s
    pub s_dot: f64,
    /// Longitudinal acceleration in m/s²
    pub s_dotdot: f64,
    /// Lateral Frenet offset in meters
    pub d: f64,
    /// Lateral speed in m/s
    pub d_dot: f64,
    /// Lateral acceleration in m/s²
    pub d_dotdot: f64,
}

impl VehState {
    /// Lane index for this state's lateral offset.
    #[inline]
    pub fn lane(&self) -> u8 {
        crate::core::math::lane_for_d(self.d)
    }
}
