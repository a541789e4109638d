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

use super::{Constraints, NlpProblem, NlpSolution, NlpSolver, SolverOpts};
use crate::errors::{ConstraintDimensionSnafu, DecisionVectorLengthSnafu};
use crate::linalg::{DMatrix, DVector};
use crate::OcpError;
use rayon::prelude::*;
use snafu::ensure;

/// Sufficient decrease parameter of the Armijo condition
const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// Exit statuses of the augmented Lagrangian solver.
pub mod status {
    /// Feasible and stationary
    pub const CONVERGED: i32 = 1;
    /// Feasible but the inner loop stalled before reaching stationarity
    pub const STALLED_FEASIBLE: i32 = 2;
    pub const MAX_ITERATIONS: i32 = 0;
    /// The line search failed at the maximum penalty without a feasible point
    pub const LINE_SEARCH_FAILURE: i32 = -1;
    pub const NON_FINITE: i32 = -2;
}

/// An augmented Lagrangian solver, minimizing
/// `J + λ·c + μ/2 ‖c‖² + 1/(2μ) Σ (max(0, ν + μh)² − ν²)`
/// with a BFGS inner loop and central finite difference gradients.
///
/// The gradient components are computed in parallel, hence the `Sync` bound on `NlpProblem`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AugmentedLagrangian {
    pub opts: SolverOpts,
}

impl AugmentedLagrangian {
    pub fn new(opts: SolverOpts) -> Self {
        Self { opts }
    }

    /// Level of the per-iteration summaries: info when verbose, debug otherwise.
    pub fn log_level(&self) -> log::Level {
        if self.opts.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }

    /// Minimizes the merit function from `w0` with BFGS.
    fn inner<N: NlpProblem + ?Sized>(
        &self,
        merit: &Merit<N>,
        w0: DVector<f64>,
    ) -> Result<InnerOutcome, OcpError> {
        let n = w0.len();
        let mut w = w0;
        let mut phi = merit.value(&w)?;
        if !phi.is_finite() {
            return Ok(InnerOutcome {
                w,
                iterations: 0,
                exit: InnerExit::NonFinite,
            });
        }
        let mut grad = merit.gradient(&w, self.opts.fd_step)?;
        let mut h_inv = DMatrix::<f64>::identity(n, n);
        let mut scaled = false;

        let mut iterations = 0;
        let mut exit = InnerExit::MaxIterations;

        while iterations < self.opts.max_inner_iterations {
            if grad.amax() <= self.opts.gradient_tolerance {
                exit = InnerExit::Stationary;
                break;
            }

            let mut dir = -(&h_inv * &grad);
            let mut slope = grad.dot(&dir);
            if slope >= 0.0 {
                // Not a descent direction, restart from steepest descent
                h_inv = DMatrix::identity(n, n);
                scaled = false;
                dir = -grad.clone();
                slope = grad.dot(&dir);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial = &w + &dir * alpha;
                match merit.value(&trial) {
                    Ok(phi_trial)
                        if phi_trial.is_finite()
                            && phi_trial <= phi + ARMIJO_C1 * alpha * slope =>
                    {
                        accepted = Some((trial, phi_trial));
                        break;
                    }
                    Ok(_) => {}
                    // Trial points may leave the domain where the problem functions are finite
                    Err(e) if e.is_numerical() => {}
                    Err(e) => return Err(e),
                }
                alpha *= 0.5;
            }

            let (w_next, phi_next) = match accepted {
                Some(step) => step,
                None => {
                    exit = InnerExit::LineSearch;
                    break;
                }
            };
            let grad_next = merit.gradient(&w_next, self.opts.fd_step)?;
            iterations += 1;

            let s = &w_next - &w;
            let y = &grad_next - &grad;
            let sy = s.dot(&y);
            if sy > f64::EPSILON * s.norm() * y.norm() {
                if !scaled {
                    h_inv = DMatrix::identity(n, n) * (sy / y.dot(&y));
                    scaled = true;
                }
                let rho = 1.0 / sy;
                let hy = &h_inv * &y;
                let yhy = y.dot(&hy);
                h_inv += (&s * s.transpose()) * (rho * rho * yhy + rho)
                    - (&hy * s.transpose() + &s * hy.transpose()) * rho;
            }

            let decrease = phi - phi_next;
            w = w_next;
            phi = phi_next;
            grad = grad_next;

            if decrease <= f64::EPSILON * phi.abs().max(1.0) {
                // No measurable progress left
                exit = InnerExit::Stalled;
                break;
            }
        }

        Ok(InnerOutcome {
            w,
            iterations,
            exit,
        })
    }
}

impl NlpSolver for AugmentedLagrangian {
    fn minimize<N: NlpProblem + ?Sized>(
        &self,
        problem: &N,
        x0: DVector<f64>,
    ) -> Result<NlpSolution, OcpError> {
        ensure!(
            x0.len() == problem.dimension(),
            DecisionVectorLengthSnafu {
                expected: problem.dimension(),
                got: x0.len()
            }
        );

        let initial = problem.constraints(&x0)?;
        let mut merit = Merit {
            problem,
            lambda: DVector::zeros(initial.eq.len()),
            nu: DVector::zeros(initial.ineq.len()),
            mu: self.opts.initial_penalty,
        };

        log!(
            self.log_level(),
            "augmented Lagrangian on {} variables, {} equalities, {} inequalities ({})",
            x0.len(),
            initial.eq.len(),
            initial.ineq.len(),
            self.opts
        );

        let mut w = x0;
        let mut iterations = 0;
        let mut prev_violation = f64::INFINITY;

        for outer in 1..=self.opts.max_outer_iterations {
            let inner = self.inner(&merit, w)?;
            w = inner.w;
            iterations += inner.iterations;

            let objective = problem.objective(&w)?;
            let cons = merit.checked_constraints(&w)?;
            let max_violation = cons.max_violation();

            log!(
                self.log_level(),
                "outer #{outer}: objective = {objective:e}, violation = {max_violation:e}, penalty = {:e}, inner iterations = {}",
                merit.mu, inner.iterations
            );

            let finish = |status: i32| NlpSolution {
                x: w.clone(),
                objective,
                status,
                iterations,
                max_violation,
            };

            if inner.exit == InnerExit::NonFinite
                || !objective.is_finite()
                || !max_violation.is_finite()
            {
                return Ok(finish(status::NON_FINITE));
            }

            if max_violation <= self.opts.tolerance {
                match inner.exit {
                    InnerExit::Stationary => return Ok(finish(status::CONVERGED)),
                    InnerExit::LineSearch | InnerExit::Stalled => {
                        return Ok(finish(status::STALLED_FEASIBLE))
                    }
                    _ => {}
                }
            } else if inner.exit == InnerExit::LineSearch
                && inner.iterations == 0
                && merit.mu >= self.opts.max_penalty
            {
                return Ok(finish(status::LINE_SEARCH_FAILURE));
            }

            merit.update(&cons);
            if max_violation > 0.25 * prev_violation {
                merit.mu = (merit.mu * self.opts.penalty_growth).min(self.opts.max_penalty);
            }
            prev_violation = max_violation;
        }

        let objective = problem.objective(&w)?;
        let max_violation = problem.constraints(&w)?.max_violation();
        warn!(
            "augmented Lagrangian reached {} outer iterations (violation = {max_violation:e})",
            self.opts.max_outer_iterations
        );
        Ok(NlpSolution {
            x: w,
            objective,
            status: status::MAX_ITERATIONS,
            iterations,
            max_violation,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InnerExit {
    Stationary,
    LineSearch,
    Stalled,
    MaxIterations,
    NonFinite,
}

struct InnerOutcome {
    w: DVector<f64>,
    iterations: usize,
    exit: InnerExit,
}

/// Augmented Lagrangian merit function with its current multipliers and penalty.
struct Merit<'a, N: NlpProblem + ?Sized> {
    problem: &'a N,
    lambda: DVector<f64>,
    nu: DVector<f64>,
    mu: f64,
}

impl<'a, N: NlpProblem + ?Sized> Merit<'a, N> {
    fn checked_constraints(&self, w: &DVector<f64>) -> Result<Constraints, OcpError> {
        let cons = self.problem.constraints(w)?;
        ensure!(
            cons.eq.len() == self.lambda.len(),
            ConstraintDimensionSnafu {
                function: "equality constraints",
                expected: self.lambda.len(),
                got: cons.eq.len()
            }
        );
        ensure!(
            cons.ineq.len() == self.nu.len(),
            ConstraintDimensionSnafu {
                function: "inequality constraints",
                expected: self.nu.len(),
                got: cons.ineq.len()
            }
        );
        Ok(cons)
    }

    fn value(&self, w: &DVector<f64>) -> Result<f64, OcpError> {
        let objective = self.problem.objective(w)?;
        let cons = self.checked_constraints(w)?;

        let eq_term = self.lambda.dot(&cons.eq) + 0.5 * self.mu * cons.eq.norm_squared();
        let ineq_term = cons
            .ineq
            .iter()
            .zip(self.nu.iter())
            .map(|(h, nu)| ((nu + self.mu * h).max(0.0).powi(2) - nu.powi(2)) / (2.0 * self.mu))
            .sum::<f64>();

        Ok(objective + eq_term + ineq_term)
    }

    /// Central finite difference gradient, one component per rayon task.
    fn gradient(&self, w: &DVector<f64>, fd_step: f64) -> Result<DVector<f64>, OcpError> {
        let grad = (0..w.len())
            .into_par_iter()
            .map(|j| {
                let h = fd_step * w[j].abs().max(1.0);
                let mut w_plus = w.clone();
                w_plus[j] += h;
                let mut w_minus = w.clone();
                w_minus[j] -= h;
                Ok((self.value(&w_plus)? - self.value(&w_minus)?) / (2.0 * h))
            })
            .collect::<Result<Vec<f64>, OcpError>>()?;

        Ok(DVector::from_vec(grad))
    }

    /// First order multiplier update.
    fn update(&mut self, cons: &Constraints) {
        self.lambda += &cons.eq * self.mu;
        for (nu, h) in self.nu.iter_mut().zip(cons.ineq.iter()) {
            *nu = (*nu + self.mu * h).max(0.0);
        }
    }
}
