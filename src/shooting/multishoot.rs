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

use super::{OptimizationResult, ShootingOpts};
use crate::errors::{
    InitialStateDimensionSnafu, InvalidConfigSnafu, NonConvergenceRawSnafu, ReconstructionSnafu,
};
use crate::linalg::DVector;
use crate::opti::{NlpProblem, NlpSolution, NlpSolver};
use crate::problem::BolzaProblem;
use crate::trajectory::Trajectory;
use crate::transcription::{DecisionLayout, Transcription};
use crate::OcpError;
use snafu::{ensure, ResultExt};
use std::fmt;
use std::time::Instant;

/// Multiple shooting is an optimization method.
///
/// The states at the shooting nodes and the controls of every interval are the decision variables
/// of a nonlinear program, and defect constraints force each node to match the simulation of
/// the previous interval.
#[derive(Debug)]
pub struct MultipleShooting<P: BolzaProblem> {
    pub problem: P,
    /// Initial state, never optimized
    pub x0: DVector<f64>,
    pub opts: ShootingOpts,
}

impl<P: BolzaProblem> MultipleShooting<P> {
    pub fn new(problem: P, x0: DVector<f64>, opts: ShootingOpts) -> Result<Self, OcpError> {
        opts.validate()?;
        ensure!(
            x0.len() == problem.state_dim(),
            InitialStateDimensionSnafu {
                expected: problem.state_dim(),
                got: x0.len()
            }
        );
        ensure!(
            x0.iter().all(|v| v.is_finite()),
            InvalidConfigSnafu {
                msg: "initial state must be finite"
            }
        );

        Ok(Self { problem, x0, opts })
    }

    pub fn layout(&self) -> DecisionLayout {
        DecisionLayout::new(
            self.problem.state_dim(),
            self.problem.control_dim(),
            self.opts.nodes,
            self.opts.final_time,
        )
    }

    /// Builds the nonlinear program solved by `solve`.
    pub fn transcription(&self) -> Result<Transcription<'_, P>, OcpError> {
        Transcription::new(
            &self.problem,
            self.x0.clone(),
            self.layout(),
            self.opts.method.integrator(),
            self.opts.parallel,
        )
    }

    /// Solves the problem with the provided solver and reconstructs the continuous trajectory.
    ///
    /// If the solver reports a non-positive status, the decoded solution is still returned, but
    /// inside an `OcpError::NonConvergence`. When that last iterate cannot even be simulated, the
    /// raw solver output comes back in `OcpError::NonConvergenceRaw` with the same status.
    pub fn solve<S: NlpSolver>(&self, solver: &S) -> Result<OptimizationResult, OcpError> {
        let start_instant = Instant::now();
        let nlp = self.transcription()?;
        info!(
            "Multiple shooting with {} variables, {} ({})",
            nlp.dimension(),
            nlp.constraint_layout(),
            self.opts
        );

        let solution = solver.minimize(&nlp, nlp.initial_guess())?;

        if solution.converged() {
            let result = self.build_result(&nlp, &solution, start_instant)?;
            info!(
                "Multiple shooting converged (status {}) in {:.3} seconds: cost = {:e}, max defect = {:e}",
                result.status,
                result.computation_dur.as_secs_f64(),
                result.cost,
                result.max_defect
            );
            return Ok(result);
        }

        let status = solution.status;
        match self.build_result(&nlp, &solution, start_instant) {
            Ok(result) => {
                warn!(
                    "Multiple shooting did NOT converge (status {}): cost = {:e}, max defect = {:e}",
                    status, result.cost, result.max_defect
                );
                Err(OcpError::NonConvergence {
                    status,
                    result: Box::new(result),
                })
            }
            Err(source) => {
                warn!("Multiple shooting did NOT converge (status {status}) and the last iterate is unusable: {source}");
                Err(source).context(NonConvergenceRawSnafu { status, solution })
            }
        }
    }

    /// Decodes a solver output, measures its defects and rebuilds its continuous trajectory.
    fn build_result(
        &self,
        nlp: &Transcription<'_, P>,
        solution: &NlpSolution,
        start_instant: Instant,
    ) -> Result<OptimizationResult, OcpError> {
        let guess = nlp.decode(&solution.x)?;
        let max_defect = nlp.max_defect(&guess)?;

        let trajectory = Trajectory::reconstruct(
            &self.problem,
            &guess.states,
            &guess.controls,
            guess.final_time,
            self.opts.method.integrator(),
            self.opts.fine_steps,
        )
        .context(ReconstructionSnafu)?;

        Ok(OptimizationResult {
            time_grid: trajectory.node_times().to_vec(),
            states: guess.states,
            controls: guess.controls,
            trajectory,
            cost: solution.objective,
            status: solution.status,
            iterations: solution.iterations,
            max_defect,
            computation_dur: start_instant.elapsed(),
        })
    }
}

impl<P: BolzaProblem + fmt::Display> fmt::Display for MultipleShooting<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Multiple shooting of {} from {:?} with {}",
            self.problem,
            self.x0.as_slice(),
            self.opts
        )
    }
}
