/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

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

use super::DecodedGuess;
use crate::errors::{IntegrationSnafu, NonFiniteValueSnafu};
use crate::linalg::DVector;
use crate::problem::BolzaProblem;
use crate::propagators::Integrator;
use crate::OcpError;
use snafu::{ensure, ResultExt};

/// Computes the Bolza cost of a guess.
///
/// The running cost is integrated over each interval with the same single step and the same
/// weights as the dynamics in the defects.
pub struct CostEvaluator<'a, P: BolzaProblem + ?Sized> {
    pub problem: &'a P,
    pub integrator: Integrator,
}

impl<'a, P: BolzaProblem + ?Sized> CostEvaluator<'a, P> {
    pub fn new(problem: &'a P, integrator: Integrator) -> Self {
        Self {
            problem,
            integrator,
        }
    }

    /// Running cost quadrature of interval `i`
    pub fn interval_cost(&self, guess: &DecodedGuess, i: usize) -> Result<f64, OcpError> {
        let dynamics = |x: &DVector<f64>, u: &DVector<f64>, t: f64| self.problem.dynamics(x, u, t);
        let running = |x: &DVector<f64>, u: &DVector<f64>, t: f64| self.problem.running_cost(x, u, t);

        let (_, cost) = self
            .integrator
            .step_with_quadrature(
                &dynamics,
                &running,
                &guess.states[i],
                &guess.controls[i],
                guess.node_time(i),
                guess.interval_length(),
            )
            .context(IntegrationSnafu { interval: i })?;

        Ok(cost)
    }

    pub fn evaluate(&self, guess: &DecodedGuess) -> Result<f64, OcpError> {
        let mut cost = 0.0;
        for i in 0..guess.nodes() {
            cost += self.interval_cost(guess, i)?;
        }

        let terminal = self
            .problem
            .terminal_cost(guess.final_state(), guess.final_time);
        ensure!(
            terminal.is_finite(),
            NonFiniteValueSnafu {
                function: "terminal cost"
            }
        );
        cost += terminal;

        ensure!(
            cost.is_finite(),
            NonFiniteValueSnafu { function: "cost" }
        );

        Ok(cost)
    }
}
