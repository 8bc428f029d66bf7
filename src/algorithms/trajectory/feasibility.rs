//! Kinematic feasibility check over a sampled Cartesian curve.
//!
//! Limits are checked on what the simulator will actually drive: the
//! point-to-point speed and the change of windowed mean speed, not the
//! polynomial coefficients.

use crate::core::constants::{ACCEL_WINDOW, SIM_DT};
use crate::core::math::distance;
use crate::core::types::Trajectory;

/// Peak point-to-point speed and peak windowed-mean acceleration.
pub fn peaks(traj: &Trajectory) -> (f64, f64) {
    let mut v_peak = 0.0_f64;
    let mut a_peak = 0.0_f64;

    let mut window_sum = 0.0;
    let mut prev_window_mean = 0.0;
    let mut have_prev_window = false;

    for i in 1..traj.states.len() {
        let a = &traj.states[i - 1];
        let b = &traj.states[i];
        let xy_speed = distance(a.x, a.y, b.x, b.y) / SIM_DT;
        v_peak = v_peak.max(xy_speed);

        window_sum += xy_speed;
        if i % ACCEL_WINDOW == 0 {
            let window_mean = window_sum / ACCEL_WINDOW as f64;
            if have_prev_window {
                let xy_accel =
                    (window_mean - prev_window_mean).abs() / (ACCEL_WINDOW as f64 * SIM_DT);
                a_peak = a_peak.max(xy_accel);
            }
            prev_window_mean = window_mean;
            have_prev_window = true;
            window_sum = 0.0;
        }
    }

    (v_peak, a_peak)
}

/// Speed and acceleration scale-back ratios for a candidate.
///
/// Both are 1.0 while the curve is within limits; otherwise the ratio of
/// limit to peak, to be applied on a single regeneration pass.
pub fn adjust_ratios(traj: &Trajectory, max_speed: f64, max_accel: f64) -> (f64, f64) {
    let (v_peak, a_peak) = peaks(traj);
    let spd_ratio = if v_peak > max_speed {
        max_speed / v_peak
    } else {
        1.0
    };
    let acc_ratio = if a_peak > max_accel {
        max_accel / a_peak
    } else {
        1.0
    };
    if spd_ratio != 1.0 || acc_ratio != 1.0 {
        log::debug!(
            "feasibility: v_peak {:.2} m/s a_peak {:.2} m/s² -> ratios ({:.3}, {:.3})",
            v_peak,
            a_peak,
            spd_ratio,
            acc_ratio
        );
    }
    (spd_ratio, acc_ratio)
}
