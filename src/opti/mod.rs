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

use crate::linalg::DVector;
use crate::OcpError;
use std::fmt;

pub mod auglag;
pub use auglag::AugmentedLagrangian;
mod options;
pub use options::SolverOpts;

/// Equality and inequality constraint values of a nonlinear program.
///
/// Equalities are satisfied at zero, inequalities when non-positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraints {
    pub ineq: DVector<f64>,
    pub eq: DVector<f64>,
}

impl Constraints {
    /// Largest absolute equality residual or positive inequality value, zero when feasible.
    pub fn max_violation(&self) -> f64 {
        let eq = self.eq.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
        self.ineq.iter().fold(eq, |acc, h| acc.max(*h))
    }
}

/// A nonlinear program as seen by a solver: an objective and constraints on a flat vector, without bounds.
pub trait NlpProblem: Sync {
    /// Number of decision variables
    fn dimension(&self) -> usize;

    fn initial_guess(&self) -> DVector<f64>;

    fn objective(&self, w: &DVector<f64>) -> Result<f64, OcpError>;

    fn constraints(&self, w: &DVector<f64>) -> Result<Constraints, OcpError>;
}

/// A constrained minimizer.
///
/// Errors raised by the problem callbacks must be returned unchanged. A non-positive status in
/// the returned solution means that the solver did not converge.
pub trait NlpSolver {
    fn minimize<N: NlpProblem + ?Sized>(
        &self,
        problem: &N,
        x0: DVector<f64>,
    ) -> Result<NlpSolution, OcpError>;
}

/// Output of an NLP solver.
#[derive(Clone, Debug, PartialEq)]
pub struct NlpSolution {
    pub x: DVector<f64>,
    pub objective: f64,
    pub status: i32,
    pub iterations: usize,
    pub max_violation: f64,
}

impl NlpSolution {
    pub fn converged(&self) -> bool {
        self.status > 0
    }
}

impl fmt::Display for NlpSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {} after {} iterations: objective = {:e}, max violation = {:e}",
            self.status, self.iterations, self.objective, self.max_violation
        )
    }
}

#[test]
fn test_max_violation() {
    let feasible = Constraints {
        ineq: DVector::from_vec(vec![-1.0, -0.5]),
        eq: DVector::zeros(0),
    };
    assert_eq!(feasible.max_violation(), 0.0);

    let infeasible = Constraints {
        ineq: DVector::from_vec(vec![-1.0, 0.25]),
        eq: DVector::from_vec(vec![0.1, -0.5]),
    };
    assert_eq!(infeasible.max_violation(), 0.5);
}
