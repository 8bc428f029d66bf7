//! Foundation data types for the planning pipeline.

mod intent;
mod state;
mod trajectory;
mod vehicle;

pub use intent::{BehaviorTarget, Intent};
pub use state::VehState;
pub use trajectory::Trajectory;
pub use vehicle::{DetectedVehicle, EgoVehicle, Vehicle};
