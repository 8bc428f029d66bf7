//! Polynomial utilities: quintic jerk-minimising trajectories.
//!
//! The quintic matching both endpoints' position, velocity and acceleration
//! is the unique minimiser of integrated squared jerk over the horizon, so
//! the solver below is the only polynomial machinery the planner needs.

use crate::error::{RajmargError, Result};
use nalgebra::{Matrix3, Vector3};

/// Boundary state `(position, velocity, acceleration)` for one Frenet axis.
pub type BoundaryState = [f64; 3];

/// Solve for the coefficients `[a0..a5]` of the jerk-minimising quintic
/// from `start` to `end` over `time` seconds.
///
/// `a0..a2` follow directly from the start state; the remaining three
/// coefficients solve a 3×3 linear system against the end state.
///
/// Fails with `DegenerateJmt` for a non-positive horizon or a singular
/// boundary system.
pub fn solve_jmt(start: &BoundaryState, end: &BoundaryState, time: f64) -> Result<[f64; 6]> {
    if time <= 0.0 {
        return Err(RajmargError::DegenerateJmt(time));
    }

    let a0 = start[0];
    let a1 = start[1];
    let a2 = start[2] / 2.0;

    let t2 = time * time;
    let t3 = t2 * time;
    let t4 = t3 * time;
    let t5 = t4 * time;

    let a = Matrix3::new(
        t3,
        t4,
        t5,
        3.0 * t2,
        4.0 * t3,
        5.0 * t4,
        6.0 * time,
        12.0 * t2,
        20.0 * t3,
    );
    let b = Vector3::new(
        end[0] - (a0 + a1 * time + a2 * t2),
        end[1] - (a1 + 2.0 * a2 * time),
        end[2] - 2.0 * a2,
    );

    let x = a
        .try_inverse()
        .map(|inv| inv * b)
        .ok_or(RajmargError::DegenerateJmt(time))?;

    Ok([a0, a1, a2, x[0], x[1], x[2]])
}

/// Evaluate a polynomial with coefficients `[a0, a1, ...]` at `t` by
/// Horner's rule.
#[inline]
pub fn eval_poly(t: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// Coefficients of the derivative polynomial.
pub fn diff_poly(coeffs: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| i as f64 * c)
        .collect()
}
