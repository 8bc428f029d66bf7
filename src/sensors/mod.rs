//! Sensor processing layer: telemetry ingest and derived lane grouping.

pub mod fusion;
pub mod lanes;

pub use fusion::SensorReading;
pub use lanes::LaneIndex;
