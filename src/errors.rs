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

use snafu::prelude::*;

use crate::opti::NlpSolution;
use crate::propagators::IntegrationError;
use crate::shooting::OptimizationResult;
use crate::trajectory::TrajError;

/// Errors of the transcription, of the solver boundary and of the driver.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum OcpError {
    /// The decision vector does not match the layout of the transcription.
    #[snafu(display("decision vector has {got} entries but the layout expects {expected}"))]
    DecisionVectorLength { expected: usize, got: usize },
    /// The initial state does not have the state dimension of the problem.
    #[snafu(display("initial state has dimension {got} but the problem has {expected} states"))]
    InitialStateDimension { expected: usize, got: usize },
    /// A constraint function changed its output size after the first evaluation.
    #[snafu(display(
        "{function} returned {got} values but {expected} were fixed at the first evaluation"
    ))]
    ConstraintDimension {
        function: &'static str,
        expected: usize,
        got: usize,
    },
    /// A state or control grid does not have the expected size.
    #[snafu(display("{what} has dimension {got} but {expected} was expected"))]
    GridDimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// A user supplied function returned NaN or infinity.
    #[snafu(display("{function} returned a non-finite value"))]
    NonFiniteValue { function: &'static str },
    /// Simulation of a shooting interval failed.
    #[snafu(display("shooting interval #{interval}: {source}"))]
    Integration {
        interval: usize,
        source: IntegrationError,
    },
    /// The solver returned a non-positive status. The diagnostic result is neither guaranteed optimal nor feasible.
    #[snafu(display("solver did not converge (status {status}), the result is not guaranteed optimal nor feasible"))]
    NonConvergence {
        status: i32,
        result: Box<OptimizationResult>,
    },
    /// The solver returned a non-positive status and its last iterate could not be turned into a
    /// diagnostic result, e.g. because a free final time went non-positive.
    #[snafu(display(
        "solver did not converge (status {status}) and its last iterate could not be decoded: {source}"
    ))]
    NonConvergenceRaw {
        status: i32,
        solution: Box<NlpSolution>,
        #[snafu(source(from(OcpError, Box::new)))]
        source: Box<OcpError>,
    },
    /// Invalid options or problem setup.
    #[snafu(display("invalid configuration: {msg}"))]
    InvalidConfig { msg: String },
    /// The continuous trajectory could not be rebuilt.
    #[snafu(display("trajectory reconstruction failed: {source}"))]
    Reconstruction { source: TrajError },
}

impl OcpError {
    /// Returns the solver status if this error is a non-convergence.
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::NonConvergence { status, .. } | Self::NonConvergenceRaw { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Returns true for errors caused by non-finite values rather than by a setup mistake.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteValue { .. }
                | Self::Integration {
                    source: IntegrationError::NonFinite { .. },
                    ..
                }
        )
    }
}
