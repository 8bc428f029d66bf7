//! Candidate trajectory generation and selection.
//!
//! Each cycle samples a small set of jerk-minimising candidates around the
//! behavior target (the base target exactly, the rest only slower and/or
//! longer), reworks any candidate that breaks the speed or acceleration
//! limits, scores everything by collision risk plus deviation from the
//! target, and picks the cheapest survivor. A keep-lane backup at reduced
//! speed is generated if every candidate was discarded as too risky.

pub mod feasibility;
pub mod risk;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::algorithms::polynomial::{diff_poly, eval_poly, solve_jmt};
use crate::config::{LimitsConfig, TrajectoryConfig};
use crate::core::constants::{
    ACC_ADJ_OFFSET, MIN_FOLLOW_SPEED_DEC, MIN_TRAJ_PT_DIST, NUM_LANES, SIM_DT, SPD_ADJ_OFFSET,
};
use crate::core::math::{distance, lane_center_d, wrap_s};
use crate::core::types::{BehaviorTarget, DetectedVehicle, Intent, Trajectory, VehState};
use crate::error::Result;
use crate::map::HighwayMap;

pub use feasibility::adjust_ratios;
pub use risk::collision_risk;

/// Generate the lowest-cost feasible trajectory for the behavior target.
///
/// `start` is the tail of the buffered prefix (or the measured ego state
/// when no buffer survives) and `buffer_len` the prefix length, used to
/// time-align risk checks against the predicted traffic.
///
/// Returns `None` only if every candidate including the backup failed to
/// build, which a positive target horizon rules out.
#[allow(clippy::too_many_arguments)]
pub fn generate(
    start: &VehState,
    behavior: &BehaviorTarget,
    ego_lane: u8,
    detected: &BTreeMap<i32, DetectedVehicle>,
    buffer_len: usize,
    map: &HighwayMap,
    config: &TrajectoryConfig,
    limits: &LimitsConfig,
    rng: &mut StdRng,
) -> Option<Trajectory> {
    let t_tgt = behavior.tgt_time;
    let v_tgt = behavior.tgt_speed;
    let a_tgt = limits.max_accel;

    let dest_lane = match behavior.intent {
        Intent::LaneChangeLeft => ego_lane.saturating_sub(1).max(1),
        Intent::LaneChangeRight => (ego_lane + 1).min(NUM_LANES),
        _ => ego_lane,
    };
    let d_tgt = lane_center_d(dest_lane);

    let dist_v = Normal::new(0.0, config.sigma_speed).ok();
    let dist_t = Normal::new(0.0, config.sigma_time).ok();

    let mut candidates: Vec<Trajectory> = Vec::new();
    for i in 0..config.candidates {
        // Candidate 0 is the exact target; the rest sample slower/longer
        let (v_delta, t_delta) = if i == 0 {
            (0.0, 0.0)
        } else {
            (
                dist_v.map(|d| d.sample(&mut *rng).max(0.0)).unwrap_or(0.0),
                dist_t.map(|d| d.sample(&mut *rng).max(0.0)).unwrap_or(0.0),
            )
        };
        let v_cand = (v_tgt - v_delta).max(0.0);
        let t_cand = t_tgt + t_delta;

        let mut traj = match build_with_rework(start, t_cand, v_cand, d_tgt, a_tgt, map, limits) {
            Ok(traj) => traj,
            Err(e) => {
                log::debug!("candidate {} dropped: {}", i, e);
                continue;
            }
        };

        let risk = collision_risk(&traj, detected, buffer_len, map.s_max());
        let deviation = (t_cand - t_tgt).abs() + (v_cand - v_tgt).abs();
        let cost = config.w_risk * risk + config.w_deviation * deviation;
        traj.cost = Some(cost);

        if cost < config.cost_threshold {
            candidates.push(traj);
        } else {
            log::debug!(
                "candidate {} discarded: cost {:.2} (risk {:.3})",
                i,
                cost,
                risk
            );
        }
    }

    // Everything too risky: back off in the current lane instead
    if candidates.is_empty() {
        log::debug!("all candidates too risky, using keep-lane backup");
        let d_backup = lane_center_d(ego_lane);
        let v_backup = v_tgt - MIN_FOLLOW_SPEED_DEC;
        match build_with_rework(start, t_tgt, v_backup, d_backup, a_tgt, map, limits) {
            Ok(mut traj) => {
                let risk = collision_risk(&traj, detected, buffer_len, map.s_max());
                traj.cost =
                    Some(config.w_risk * risk + config.w_deviation * MIN_FOLLOW_SPEED_DEC);
                candidates.push(traj);
            }
            Err(e) => {
                log::warn!("backup trajectory failed: {}", e);
                return None;
            }
        }
    }

    // Lowest cost wins; the strict comparison keeps the earliest on ties
    candidates.into_iter().reduce(|best, cand| {
        if cand.cost.unwrap_or(f64::MAX) < best.cost.unwrap_or(f64::MAX) {
            cand
        } else {
            best
        }
    })
}

/// Build a candidate, then rebuild it once with scaled-back targets if the
/// sampled curve breaks the Cartesian speed or acceleration limits.
fn build_with_rework(
    start: &VehState,
    t_tgt: f64,
    v_tgt: f64,
    d_tgt: f64,
    a_tgt: f64,
    map: &HighwayMap,
    limits: &LimitsConfig,
) -> Result<Trajectory> {
    let traj = build_candidate(start, t_tgt, v_tgt, d_tgt, a_tgt, map)?;
    let (spd_ratio, acc_ratio) = adjust_ratios(&traj, limits.target_speed, limits.max_accel);
    if spd_ratio == 1.0 && acc_ratio == 1.0 {
        return Ok(traj);
    }
    build_candidate(
        start,
        t_tgt,
        v_tgt * spd_ratio - SPD_ADJ_OFFSET,
        d_tgt,
        a_tgt * acc_ratio - ACC_ADJ_OFFSET,
        map,
    )
}

/// Sample one jerk-minimising trajectory toward `(v_tgt, d_tgt)` over
/// `t_tgt` seconds.
///
/// The terminal longitudinal state comes from a constant-acceleration
/// estimate so the JMT endpoint stays kinematically honest: if `v_tgt` is
/// unreachable within the horizon at `a_tgt`, the endpoint speed is cut to
/// what the horizon allows.
fn build_candidate(
    start: &VehState,
    t_tgt: f64,
    v_tgt: f64,
    d_tgt: f64,
    a_tgt: f64,
    map: &HighwayMap,
) -> Result<Trajectory> {
    let dv = v_tgt - start.s_dot;
    let t_maxa = dv.abs() / a_tgt;
    let a_signed = if dv >= 0.0 { a_tgt } else { -a_tgt };

    let (s_dot_end, s_ddot_end) = if t_maxa > t_tgt {
        (start.s_dot + a_signed * t_tgt, a_signed)
    } else {
        (v_tgt, dv / t_tgt)
    };
    let s_end = start.s + start.s_dot * t_tgt + 0.5 * s_ddot_end * t_tgt * t_tgt;

    let coeffs_s = solve_jmt(
        &[start.s, start.s_dot, start.s_dotdot],
        &[s_end, s_dot_end, s_ddot_end],
        t_tgt,
    )?;
    let coeffs_s_dot = diff_poly(&coeffs_s);
    let coeffs_s_ddot = diff_poly(&coeffs_s_dot);

    let coeffs_d = solve_jmt(
        &[start.d, start.d_dot, start.d_dotdot],
        &[d_tgt, 0.0, 0.0],
        t_tgt,
    )?;
    let coeffs_d_dot = diff_poly(&coeffs_d);
    let coeffs_d_ddot = diff_poly(&coeffs_d_dot);

    let num_pts = (t_tgt / SIM_DT).round() as usize;
    let mut traj = Trajectory::new();
    for i in 1..num_pts {
        let t = i as f64 * SIM_DT;
        let s = wrap_s(eval_poly(t, &coeffs_s), map.s_max());
        let d = eval_poly(t, &coeffs_d);
        let (x, y) = map.frenet_to_xy(s, d);
        let mut state = VehState {
            x,
            y,
            s,
            d,
            s_dot: eval_poly(t, &coeffs_s_dot),
            s_dotdot: eval_poly(t, &coeffs_s_ddot),
            d_dot: eval_poly(t, &coeffs_d_dot),
            d_dotdot: eval_poly(t, &coeffs_d_ddot),
        };

        // Freeze micro-motion so the simulator never sees jitter steps
        if let Some(prev) = traj.states.last() {
            if distance(state.x, state.y, prev.x, prev.y) < MIN_TRAJ_PT_DIST {
                state = *prev;
            }
        }
        traj.states.push(state);
    }

    Ok(traj)
}
