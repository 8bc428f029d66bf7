//! Core planning algorithms: polynomials, prediction, behavior, trajectories.

pub mod behavior;
pub mod polynomial;
pub mod prediction;
pub mod trajectory;
