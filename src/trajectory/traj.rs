/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::traj_it::TrajIterator;
use super::{
    CreationSnafu, InterpolationSnafu, InvalidStepSnafu, OutOfRangeSnafu, PropagationSnafu,
    TrajError,
};
use crate::linalg::DVector;
use crate::polyfit::{hermite, Polynomial};
use crate::problem::BolzaProblem;
use crate::propagators::{IntegrationError, Integrator};
use snafu::{ensure, ResultExt};
use std::fmt;

/// Relative tolerance on the bounds of the time span
const SPAN_TOLERANCE: f64 = 1e-12;

/// A cubic per state component on `[start, start + duration]`, evaluated in local time.
#[derive(Clone, Debug, PartialEq)]
struct Segment {
    start: f64,
    duration: f64,
    polynomials: Vec<Polynomial<4>>,
}

impl Segment {
    fn state(&self, t: f64) -> DVector<f64> {
        let tau = (t - self.start).clamp(0.0, self.duration);
        DVector::from_iterator(
            self.polynomials.len(),
            self.polynomials.iter().map(|p| p.eval(tau)),
        )
    }
}

/// A sample of the trajectory
#[derive(Clone, Debug, PartialEq)]
pub struct TrajSample {
    pub t: f64,
    pub state: DVector<f64>,
    pub control: DVector<f64>,
}

/// Continuous state and control trajectories over `[0, tf]`.
///
/// The state is a piecewise cubic Hermite interpolant of a fine re-simulation of every shooting
/// interval. The control is piecewise linear through the start of each interval, plus a last
/// knot at `tf` which repeats the control of the last interval.
///
/// At a boundary between two pieces, the piece which starts there is used.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    tf: f64,
    node_times: Vec<f64>,
    segments: Vec<Segment>,
    control_knots: Vec<(f64, DVector<f64>)>,
}

impl Trajectory {
    /// Re-simulates every interval from its node with `fine_steps` steps and interpolates the samples.
    pub fn reconstruct<P: BolzaProblem + ?Sized>(
        problem: &P,
        states: &[DVector<f64>],
        controls: &[DVector<f64>],
        tf: f64,
        integrator: Integrator,
        fine_steps: usize,
    ) -> Result<Self, TrajError> {
        let nodes = controls.len();
        ensure!(
            nodes > 0 && states.len() == nodes + 1,
            CreationSnafu {
                msg: format!(
                    "{} states and {} controls, expected one more state than controls",
                    states.len(),
                    nodes
                )
            }
        );
        ensure!(
            tf.is_finite() && tf > 0.0,
            CreationSnafu {
                msg: format!("final time must be positive and finite, got {tf}")
            }
        );

        let dt = tf / (nodes as f64);
        let mut node_times: Vec<f64> = (0..nodes).map(|i| (i as f64) * dt).collect();
        node_times.push(tf);

        let dynamics = |x: &DVector<f64>, u: &DVector<f64>, t: f64| problem.dynamics(x, u, t);

        let mut segments = Vec::with_capacity(nodes * fine_steps);
        for (i, (x_start, u)) in states.iter().zip(controls.iter()).enumerate() {
            let t_start = node_times[i];
            let samples = integrator
                .simulate(&dynamics, x_start, u, t_start, dt, fine_steps)
                .context(PropagationSnafu { interval: i })?;

            let h = dt / (fine_steps as f64);
            let mut derivs = Vec::with_capacity(samples.len());
            for (k, x) in samples.iter().enumerate() {
                let t = t_start + (k as f64) * h;
                let xdot = problem.dynamics(x, u, t);
                if xdot.len() != x.len() {
                    return Err(TrajError::Propagation {
                        interval: i,
                        source: IntegrationError::DerivativeDimension {
                            expected: x.len(),
                            got: xdot.len(),
                        },
                    });
                } else if xdot.iter().any(|v| !v.is_finite()) {
                    return Err(TrajError::Propagation {
                        interval: i,
                        source: IntegrationError::NonFinite { t },
                    });
                }
                derivs.push(xdot);
            }

            for k in 0..fine_steps {
                let polynomials = (0..x_start.len())
                    .map(|j| {
                        hermite::<4>(
                            &[0.0, h],
                            &[samples[k][j], samples[k + 1][j]],
                            &[derivs[k][j], derivs[k + 1][j]],
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .context(InterpolationSnafu)?;

                segments.push(Segment {
                    start: t_start + (k as f64) * h,
                    duration: h,
                    polynomials,
                });
            }
        }

        let mut control_knots: Vec<(f64, DVector<f64>)> = controls
            .iter()
            .enumerate()
            .map(|(i, u)| (node_times[i], u.clone()))
            .collect();
        control_knots.push((tf, controls[nodes - 1].clone()));

        debug!(
            "reconstructed trajectory over [0, {tf}] with {} segments",
            segments.len()
        );

        Ok(Self {
            tf,
            node_times,
            segments,
            control_knots,
        })
    }

    pub fn final_time(&self) -> f64 {
        self.tf
    }

    /// Times of the N+1 shooting nodes
    pub fn node_times(&self) -> &[f64] {
        &self.node_times
    }

    /// Checks that `t` is in the span, within tolerance, and clamps it to the span.
    fn clamp(&self, t: f64) -> Result<f64, TrajError> {
        let tol = SPAN_TOLERANCE * self.tf.max(1.0);
        ensure!(
            t >= -tol && t <= self.tf + tol,
            OutOfRangeSnafu { t, tf: self.tf }
        );
        Ok(t.clamp(0.0, self.tf))
    }

    pub fn state_at(&self, t: f64) -> Result<DVector<f64>, TrajError> {
        let t = self.clamp(t)?;
        let idx = self
            .segments
            .partition_point(|seg| seg.start <= t)
            .saturating_sub(1);
        Ok(self.segments[idx].state(t))
    }

    pub fn control_at(&self, t: f64) -> Result<DVector<f64>, TrajError> {
        let t = self.clamp(t)?;
        let last = self.control_knots.len() - 2;
        let idx = self
            .control_knots
            .partition_point(|(tk, _)| *tk <= t)
            .saturating_sub(1)
            .min(last);

        let (t0, u0) = &self.control_knots[idx];
        let (t1, u1) = &self.control_knots[idx + 1];
        let frac = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        Ok(u0 + (u1 - u0) * frac)
    }

    /// Returns both the state and the control at `t`.
    pub fn at(&self, t: f64) -> Result<TrajSample, TrajError> {
        Ok(TrajSample {
            t,
            state: self.state_at(t)?,
            control: self.control_at(t)?,
        })
    }

    /// Creates an iterator through the trajectory by the provided step size, always including the final time.
    pub fn every(&self, step: f64) -> Result<TrajIterator<'_>, TrajError> {
        ensure!(step.is_finite() && step > 0.0, InvalidStepSnafu { step });
        Ok(TrajIterator {
            traj: self,
            step,
            k: 0,
            done: false,
        })
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trajectory over [0, {}] with {} shooting intervals and {} segments",
            self.tf,
            self.node_times.len() - 1,
            self.segments.len()
        )
    }
}
