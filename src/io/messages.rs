//! Wire messages exchanged with the driving simulator.
//!
//! One JSON telemetry frame in, one JSON path reply out, newline-delimited.

use serde::{Deserialize, Serialize};

use crate::sensors::SensorReading;

/// The not-yet-consumed tail of the previously emitted path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousPath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// One row of the simulator's sensor-fusion array.
///
/// The reported `(s, d)` are carried for contract completeness but the
/// planner recomputes both from `(x, y)` against its own dense map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFusionRow {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub s: f64,
    pub d: f64,
}

impl SensorFusionRow {
    /// The fields the fusion layer actually consumes.
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            id: self.id,
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
        }
    }
}

/// One inbound telemetry frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Measured ego position now.
    pub x: f64,
    pub y: f64,
    pub previous_path: PreviousPath,
    pub sensor_fusion: Vec<SensorFusionRow>,
}

/// The outbound path, in emission order at the simulator tick spacing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathMessage {
    pub next_x: Vec<f64>,
    pub next_y: Vec<f64>,
}
