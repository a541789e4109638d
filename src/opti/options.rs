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

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// SolverOpts stores the configuration of the augmented Lagrangian solver.
///
/// The tolerance applies to the constraint violation, the gradient tolerance to the inner BFGS
/// loop on the augmented Lagrangian. The finite difference step is relative to `max(1, |w_j|)`.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
#[serde(default)]
pub struct SolverOpts {
    #[builder(default = 50)]
    pub max_outer_iterations: usize,
    #[builder(default = 500)]
    pub max_inner_iterations: usize,
    #[builder(default = 1e-8)]
    pub tolerance: f64,
    #[builder(default = 1e-6)]
    pub gradient_tolerance: f64,
    #[builder(default = 1e-6)]
    pub fd_step: f64,
    #[builder(default = 10.0)]
    pub initial_penalty: f64,
    #[builder(default = 10.0)]
    pub penalty_growth: f64,
    #[builder(default = 1e10)]
    pub max_penalty: f64,
    /// Log every outer iteration at the info level instead of debug.
    #[builder(default = false)]
    pub verbose: bool,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for SolverOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outer: {}, inner: {}, tol: {:e}, grad tol: {:e}, fd step: {:e}, penalty: {:e} (x{} up to {:e})",
            self.max_outer_iterations,
            self.max_inner_iterations,
            self.tolerance,
            self.gradient_tolerance,
            self.fd_step,
            self.initial_penalty,
            self.penalty_growth,
            self.max_penalty
        )
    }
}

#[test]
fn test_solver_opts_defaults() {
    let opts = SolverOpts::default();
    assert_eq!(opts.max_outer_iterations, 50);
    assert_eq!(opts.max_inner_iterations, 500);
    assert!(!opts.verbose);

    let opts = SolverOpts::builder()
        .max_outer_iterations(3)
        .verbose(true)
        .build();
    assert_eq!(opts.max_outer_iterations, 3);
    assert!(opts.verbose);
    assert_eq!(opts.tolerance, 1e-8);
    println!("{opts}");
}
