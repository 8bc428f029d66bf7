//! Driving intents and the behavior target they produce.

use serde::{Deserialize, Serialize};

/// Lateral intent of a vehicle.
///
/// For the ego this is the output of the behavior state machine; for detected
/// cars it is inferred from lateral velocity with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Intent {
    /// Never observed long enough to classify.
    #[default]
    Unknown,
    KeepLane,
    /// Wants the left lane, waiting for a safe gap.
    PlanLaneChangeLeft,
    /// Wants the right lane, waiting for a safe gap.
    PlanLaneChangeRight,
    LaneChangeLeft,
    LaneChangeRight,
}

impl Intent {
    /// Short tag for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Unknown => "??",
            Intent::KeepLane => "KL",
            Intent::PlanLaneChangeLeft => "PLCL",
            Intent::PlanLaneChangeRight => "PLCR",
            Intent::LaneChangeLeft => "LCL",
            Intent::LaneChangeRight => "LCR",
        }
    }

    /// True while a lane change is being executed.
    pub fn is_changing(&self) -> bool {
        matches!(self, Intent::LaneChangeLeft | Intent::LaneChangeRight)
    }
}

/// Target produced by the behavior layer for the trajectory generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTarget {
    pub intent: Intent,
    /// Destination lane, 1..=NUM_LANES, at most one lane from the current.
    pub tgt_lane: u8,
    /// Horizon to reach the target state, in seconds.
    pub tgt_time: f64,
    /// Terminal longitudinal speed, in m/s.
    pub tgt_speed: f64,
}

impl Default for BehaviorTarget {
    fn default() -> Self {
        Self {
            intent: Intent::Unknown,
            tgt_lane: 1,
            tgt_time: crate::core::constants::NEW_PATH_TIME,
            tgt_speed: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_changing() {
        assert!(Intent::LaneChangeLeft.is_changing());
        assert!(Intent::LaneChangeRight.is_changing());
        assert!(!Intent::PlanLaneChangeLeft.is_changing());
        assert!(!Intent::KeepLane.is_changing());
    }

    #[test]
    fn test_default_intent_unknown() {
        assert_eq!(Intent::default(), Intent::Unknown);
    }
}
