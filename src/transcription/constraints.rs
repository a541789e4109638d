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
use crate::errors::{
    ConstraintDimensionSnafu, GridDimensionSnafu, IntegrationSnafu, NonFiniteValueSnafu,
};
use crate::linalg::DVector;
use crate::problem::BolzaProblem;
use crate::propagators::Integrator;
use crate::OcpError;
use rayon::prelude::*;
use snafu::{ensure, ResultExt};
use std::fmt;

pub use crate::opti::Constraints;

/// Sizes of every constraint block, fixed once by probing the problem functions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintLayout {
    pub path_eq: usize,
    pub path_ineq: usize,
    pub terminal_eq: usize,
    pub terminal_ineq: usize,
    pub state_dim: usize,
    pub nodes: usize,
    pub free_final_time: bool,
}

impl ConstraintLayout {
    /// Evaluates every constraint function once on the guess and records the size of its output.
    pub fn from_first_evaluation<P: BolzaProblem + ?Sized>(
        problem: &P,
        guess: &DecodedGuess,
        free_final_time: bool,
    ) -> Self {
        let x0 = &guess.states[0];
        let u0 = guess.node_control(0);
        let xf = guess.final_state();
        let tf = guess.final_time;

        let layout = Self {
            path_eq: problem.path_eq(x0, u0).len(),
            path_ineq: problem.path_ineq(x0, u0).len(),
            terminal_eq: problem.terminal_eq(xf, tf).len(),
            terminal_ineq: problem.terminal_ineq(xf, tf).len(),
            state_dim: problem.state_dim(),
            nodes: guess.nodes(),
            free_final_time,
        };
        debug!("constraint layout: {layout}");
        layout
    }

    /// Path equalities at every node, terminal equalities, then the defects
    pub fn eq_len(&self) -> usize {
        self.path_eq * (self.nodes + 1) + self.terminal_eq + self.state_dim * self.nodes
    }

    /// Path inequalities at every node, terminal inequalities, then `-tf` if free
    pub fn ineq_len(&self) -> usize {
        self.path_ineq * (self.nodes + 1) + self.terminal_ineq + usize::from(self.free_final_time)
    }
}

impl fmt::Display for ConstraintLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} equalities ({} path x {} nodes, {} terminal, {} defects), {} inequalities ({} path x {} nodes, {} terminal{})",
            self.eq_len(),
            self.path_eq,
            self.nodes + 1,
            self.terminal_eq,
            self.state_dim * self.nodes,
            self.ineq_len(),
            self.path_ineq,
            self.nodes + 1,
            self.terminal_ineq,
            if self.free_final_time { ", -tf" } else { "" }
        )
    }
}

/// Copies one constraint block at `offset`, after checking its size and finiteness.
fn write_block(
    dest: &mut DVector<f64>,
    offset: usize,
    block: &DVector<f64>,
    expected: usize,
    function: &'static str,
) -> Result<usize, OcpError> {
    ensure!(
        block.len() == expected,
        ConstraintDimensionSnafu {
            function,
            expected,
            got: block.len()
        }
    );
    ensure!(
        block.iter().all(|v| v.is_finite()),
        NonFiniteValueSnafu { function }
    );
    dest.rows_mut(offset, expected).copy_from(block);
    Ok(offset + expected)
}

/// Builds the equality and inequality vectors in an order which never changes between calls.
pub struct ConstraintAssembler<'a, P: BolzaProblem + ?Sized> {
    pub problem: &'a P,
    pub integrator: Integrator,
    pub layout: ConstraintLayout,
    /// Evaluate the defects of all intervals in parallel
    pub parallel: bool,
}

impl<'a, P: BolzaProblem + ?Sized> ConstraintAssembler<'a, P> {
    pub fn new(
        problem: &'a P,
        integrator: Integrator,
        layout: ConstraintLayout,
        parallel: bool,
    ) -> Self {
        Self {
            problem,
            integrator,
            layout,
            parallel,
        }
    }

    /// Defect of interval `i`: `x_{i+1}` minus the one step simulation from `x_i`
    pub fn defect(&self, guess: &DecodedGuess, i: usize) -> Result<DVector<f64>, OcpError> {
        let dynamics = |x: &DVector<f64>, u: &DVector<f64>, t: f64| self.problem.dynamics(x, u, t);
        let propagated = self
            .integrator
            .step(
                &dynamics,
                &guess.states[i],
                &guess.controls[i],
                guess.node_time(i),
                guess.interval_length(),
            )
            .context(IntegrationSnafu { interval: i })?;

        Ok(&guess.states[i + 1] - propagated)
    }

    /// All defects, in interval order.
    pub fn defects(&self, guess: &DecodedGuess) -> Result<Vec<DVector<f64>>, OcpError> {
        if self.parallel {
            (0..guess.nodes())
                .into_par_iter()
                .map(|i| self.defect(guess, i))
                .collect()
        } else {
            (0..guess.nodes()).map(|i| self.defect(guess, i)).collect()
        }
    }

    pub fn assemble(&self, guess: &DecodedGuess) -> Result<Constraints, OcpError> {
        let layout = &self.layout;
        ensure!(
            guess.nodes() == layout.nodes && guess.states.len() == layout.nodes + 1,
            GridDimensionSnafu {
                what: "shooting grid",
                expected: layout.nodes,
                got: guess.nodes()
            }
        );
        let xf = guess.final_state();
        let tf = guess.final_time;

        let mut eq = DVector::zeros(layout.eq_len());
        let mut offset = 0;
        for (i, x) in guess.states.iter().enumerate() {
            let g = self.problem.path_eq(x, guess.node_control(i));
            offset = write_block(&mut eq, offset, &g, layout.path_eq, "path equality")?;
        }
        let q = self.problem.terminal_eq(xf, tf);
        offset = write_block(&mut eq, offset, &q, layout.terminal_eq, "terminal equality")?;
        for defect in self.defects(guess)? {
            offset = write_block(&mut eq, offset, &defect, layout.state_dim, "dynamics")?;
        }

        let mut ineq = DVector::zeros(layout.ineq_len());
        let mut offset = 0;
        for (i, x) in guess.states.iter().enumerate() {
            let h = self.problem.path_ineq(x, guess.node_control(i));
            offset = write_block(&mut ineq, offset, &h, layout.path_ineq, "path inequality")?;
        }
        let r = self.problem.terminal_ineq(xf, tf);
        offset = write_block(
            &mut ineq,
            offset,
            &r,
            layout.terminal_ineq,
            "terminal inequality",
        )?;
        if layout.free_final_time {
            ineq[offset] = -tf;
        }

        Ok(Constraints { ineq, eq })
    }
}
