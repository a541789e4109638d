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
use crate::trajectory::Trajectory;
use std::fmt;
use std::time::Duration;

/// Defines a multiple shooting solution
#[derive(Clone, Debug)]
pub struct OptimizationResult {
    /// The N+1 states at the shooting nodes, the first one is the initial state
    pub states: Vec<DVector<f64>>,
    /// The N controls, one per interval
    pub controls: Vec<DVector<f64>>,
    /// Times of the shooting nodes
    pub time_grid: Vec<f64>,
    pub trajectory: Trajectory,
    /// Bolza cost of the solution
    pub cost: f64,
    /// Exit status of the solver, non-positive on failure
    pub status: i32,
    /// The number of iterations required
    pub iterations: usize,
    /// Largest defect norm over the shooting intervals
    pub max_defect: f64,
    /// Computation duration
    pub computation_dur: Duration,
}

impl OptimizationResult {
    pub fn converged(&self) -> bool {
        self.status > 0
    }

    pub fn final_time(&self) -> f64 {
        self.trajectory.final_time()
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut nodemsg = String::new();
        for (i, (t, x)) in self.time_grid.iter().zip(self.states.iter()).enumerate() {
            nodemsg.push_str(&format!("\n\t\t#{i} @ t = {t:.6}: x = {:?}", x.as_slice()));
            if let Some(u) = self.controls.get(i) {
                nodemsg.push_str(&format!("\tu = {:?}", u.as_slice()));
            }
        }

        writeln!(
            f,
            "Multiple shooting solution ({}, status {}) in {:.3} seconds, {} iterations:\n\tcost = {:e}\n\tmax defect = {:e}\n\ttf = {}\n\tNodes:{}",
            if self.converged() { "converged" } else { "NOT converged" },
            self.status,
            self.computation_dur.as_secs_f64(),
            self.iterations,
            self.cost,
            self.max_defect,
            self.final_time(),
            nodemsg
        )
    }
}
