//! Highway centerline map: dense waypoint tables and frame conversions.
//!
//! The sparse centerline samples from the map file are resampled once at
//! startup into tables spaced every [`MAP_DS`] by fitting a natural cubic
//! spline through each of `x(s)`, `y(s)`, `dx(s)`, `dy(s)`. All Frenet
//! conversions afterwards index the dense tables, so per-frame work never
//! touches the splines again.

pub mod spline;

use crate::core::constants::MAP_DS;
use crate::core::math::{distance, wrap_s};
use crate::error::{RajmargError, Result};
use spline::CubicSpline;
use std::path::Path;

/// One sparse centerline sample: position plus the lane-normal unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Dense, immutable lookup tables for the highway loop.
#[derive(Debug, Clone)]
pub struct HighwayMap {
    /// Loop length; `s` wraps at this value.
    s_max: f64,
    s: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    /// Lane-normal unit vectors (toward increasing `d`).
    nx: Vec<f64>,
    ny: Vec<f64>,
    /// Unit tangents along increasing `s`.
    tx: Vec<f64>,
    ty: Vec<f64>,
}

impl HighwayMap {
    /// Load the waypoint table from a whitespace-separated text file
    /// (`s x y dx dy`, one waypoint per line).
    ///
    /// The loop length is the last `s` plus the closing gap back to the
    /// first waypoint.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RajmargError::MapLoad(format!("{}: {}", path.display(), e)))?;

        let mut waypoints = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>().map_err(|e| {
                        RajmargError::MapLoad(format!("line {}: {}", lineno + 1, e))
                    })
                })
                .collect::<Result<_>>()?;
            if fields.len() != 5 {
                return Err(RajmargError::MapLoad(format!(
                    "line {}: expected 5 fields, got {}",
                    lineno + 1,
                    fields.len()
                )));
            }
            waypoints.push(Waypoint {
                s: fields[0],
                x: fields[1],
                y: fields[2],
                dx: fields[3],
                dy: fields[4],
            });
        }

        if waypoints.len() < 2 {
            return Err(RajmargError::MapLoad(format!(
                "{}: need at least 2 waypoints, got {}",
                path.display(),
                waypoints.len()
            )));
        }

        let first = waypoints[0];
        let last = waypoints[waypoints.len() - 1];
        let s_max = last.s + distance(last.x, last.y, first.x, first.y);
        Ok(Self::from_waypoints(&waypoints, s_max))
    }

    /// Build the dense tables from in-memory waypoints and an explicit loop
    /// length. Used by the loader and by synthetic test tracks.
    pub fn from_waypoints(waypoints: &[Waypoint], s_max: f64) -> Self {
        debug_assert!(waypoints.len() >= 2);
        debug_assert!(s_max > waypoints.last().unwrap().s);

        // Close the loop so the spline covers [0, s_max] without a seam gap
        let mut knots_s = Vec::with_capacity(waypoints.len() + 1);
        let mut knots_x = Vec::with_capacity(waypoints.len() + 1);
        let mut knots_y = Vec::with_capacity(waypoints.len() + 1);
        let mut knots_nx = Vec::with_capacity(waypoints.len() + 1);
        let mut knots_ny = Vec::with_capacity(waypoints.len() + 1);
        for wp in waypoints {
            knots_s.push(wp.s);
            knots_x.push(wp.x);
            knots_y.push(wp.y);
            knots_nx.push(wp.dx);
            knots_ny.push(wp.dy);
        }
        let first = waypoints[0];
        knots_s.push(s_max);
        knots_x.push(first.x);
        knots_y.push(first.y);
        knots_nx.push(first.dx);
        knots_ny.push(first.dy);

        let spline_x = CubicSpline::fit(&knots_s, &knots_x);
        let spline_y = CubicSpline::fit(&knots_s, &knots_y);
        let spline_nx = CubicSpline::fit(&knots_s, &knots_nx);
        let spline_ny = CubicSpline::fit(&knots_s, &knots_ny);

        let n = (s_max / MAP_DS).ceil() as usize;
        let mut s = Vec::with_capacity(n);
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut nx = Vec::with_capacity(n);
        let mut ny = Vec::with_capacity(n);
        let mut tx = Vec::with_capacity(n);
        let mut ty = Vec::with_capacity(n);

        for i in 0..n {
            let si = i as f64 * MAP_DS;
            s.push(si);
            x.push(spline_x.value(si));
            y.push(spline_y.value(si));

            // Spline interpolation denormalizes the unit vectors slightly
            let (nxi, nyi) = normalize(spline_nx.value(si), spline_ny.value(si));
            nx.push(nxi);
            ny.push(nyi);

            let (txi, tyi) = normalize(spline_x.derivative(si), spline_y.derivative(si));
            tx.push(txi);
            ty.push(tyi);
        }

        Self {
            s_max,
            s,
            x,
            y,
            nx,
            ny,
            tx,
            ty,
        }
    }

    /// Loop length along `s`.
    pub fn s_max(&self) -> f64 {
        self.s_max
    }

    /// Number of dense table entries.
    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Convert Frenet `(s, d)` to Cartesian `(x, y)`.
    ///
    /// `s` is wrapped into the loop; values between dense samples are
    /// linearly interpolated.
    pub fn frenet_to_xy(&self, s: f64, d: f64) -> (f64, f64) {
        let w = wrap_s(s, self.s_max);
        let fidx = w / MAP_DS;
        let i = (fidx as usize).min(self.len() - 1);
        let j = (i + 1) % self.len();
        let frac = fidx - i as f64;

        let xi = self.x[i] + frac * (self.x[j] - self.x[i]);
        let yi = self.y[i] + frac * (self.y[j] - self.y[i]);
        let nxi = self.nx[i] + frac * (self.nx[j] - self.nx[i]);
        let nyi = self.ny[i] + frac * (self.ny[j] - self.ny[i]);

        (xi + d * nxi, yi + d * nyi)
    }

    /// Convert Cartesian `(x, y)` to Frenet `(s, d)`.
    ///
    /// Finds the nearest dense waypoint, then projects the offset onto the
    /// local normal for `d` and onto the local tangent for the `s`
    /// refinement.
    pub fn xy_to_frenet(&self, x: f64, y: f64) -> (f64, f64) {
        let k = self.nearest_index(x, y);
        let ox = x - self.x[k];
        let oy = y - self.y[k];
        let d = ox * self.nx[k] + oy * self.ny[k];
        let s = wrap_s(self.s[k] + ox * self.tx[k] + oy * self.ty[k], self.s_max);
        (s, d)
    }

    /// Rotate a Cartesian velocity into Frenet rates at arc position `s`.
    pub fn frenet_velocity(&self, s: f64, vx: f64, vy: f64) -> (f64, f64) {
        let w = wrap_s(s, self.s_max);
        let i = ((w / MAP_DS) as usize).min(self.len() - 1);
        let s_dot = vx * self.tx[i] + vy * self.ty[i];
        let d_dot = vx * self.nx[i] + vy * self.ny[i];
        (s_dot, d_dot)
    }

    fn nearest_index(&self, x: f64, y: f64) -> usize {
        let mut best = 0;
        let mut best_sq = f64::INFINITY;
        for i in 0..self.len() {
            let dx = x - self.x[i];
            let dy = y - self.y[i];
            let sq = dx * dx + dy * dy;
            if sq < best_sq {
                best_sq = sq;
                best = i;
            }
        }
        best
    }
}

#[inline]
fn normalize(x: f64, y: f64) -> (f64, f64) {
    let norm = (x * x + y * y).sqrt();
    if norm < 1e-12 {
        (0.0, 0.0)
    } else {
        (x / norm, y / norm)
    }
}
