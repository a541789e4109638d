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

/*! # nyx-ocp

Direct multiple shooting for optimal control problems in Bolza form.

The continuous problem (dynamics, running and terminal costs, path and terminal constraints) is
transcribed into a nonlinear program over a shooting grid. Any solver implementing [`opti::NlpSolver`]
can then minimize it, and the discrete solution is turned back into continuous trajectories.

```
use nyx_ocp::prelude::*;

// Drive a single integrator from 1 to 0 in one second with minimum energy.
let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, u, _t| u[0].powi(2))
    .with_terminal_eq(|x, _tf| x.clone());

let opts = ShootingOpts::builder()
    .nodes(10)
    .final_time(FinalTime::Fixed(1.0))
    .build();

let ms = MultipleShooting::new(problem, DVector::from_vec(vec![1.0]), opts).unwrap();
let sol = ms.solve(&AugmentedLagrangian::default()).unwrap();
assert!((sol.cost - 1.0).abs() < 1e-4);
```
*/

/// Fixed step integrators used to simulate each shooting interval.
pub mod propagators;

/// Definition of the optimal control problem: dynamics, costs and constraints.
pub mod problem;

/// Transcription of the optimal control problem into a nonlinear program.
pub mod transcription;

/// Continuous trajectories rebuilt from the discrete solution.
pub mod trajectory;

/// The multiple shooting driver and its solution.
pub mod shooting;

/// Optimization module: the nonlinear program solver contract and a reference solver.
pub mod opti;

/// Polynomial and fitting module
pub mod polyfit;

mod errors;
/// Functions which may fail will return an error, nothing in here is expected to panic.
pub use self::errors::OcpError;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export of the most commonly used structures.
pub mod prelude {
    pub use crate::linalg::{DMatrix, DVector};
    pub use crate::opti::{AugmentedLagrangian, NlpProblem, NlpSolution, NlpSolver, SolverOpts};
    pub use crate::problem::{BolzaProblem, ProblemDefinition};
    pub use crate::propagators::{IntegrationMethod, Integrator};
    pub use crate::shooting::{MultipleShooting, OptimizationResult, ShootingOpts};
    pub use crate::trajectory::Trajectory;
    pub use crate::transcription::{Constraints, DecisionLayout, FinalTime, Transcription};
    pub use crate::OcpError;
}
