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

use crate::errors::{
    DecisionVectorLengthSnafu, GridDimensionSnafu, InitialStateDimensionSnafu, InvalidConfigSnafu,
};
use crate::linalg::DVector;
use crate::OcpError;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;

/// Initial value of the final time slot when it is free
pub const FREE_FINAL_TIME_GUESS: f64 = 10.0;

/// Final time of the problem: either fixed by the caller, or optimized as the last decision variable.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FinalTime {
    Fixed(f64),
    Free,
}

impl FinalTime {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

impl fmt::Display for FinalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(tf) => write!(f, "fixed tf = {tf}"),
            Self::Free => write!(f, "free tf"),
        }
    }
}

/// Layout of the decision vector: the states of nodes 1 through N (node major), then the controls
/// of intervals 0 through N-1, then the final time if it is free.
///
/// The initial state is never a decision variable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecisionLayout {
    pub state_dim: usize,
    pub control_dim: usize,
    pub nodes: usize,
    pub final_time: FinalTime,
}

impl DecisionLayout {
    pub fn new(state_dim: usize, control_dim: usize, nodes: usize, final_time: FinalTime) -> Self {
        Self {
            state_dim,
            control_dim,
            nodes,
            final_time,
        }
    }

    pub fn free_final_time(&self) -> bool {
        self.final_time.is_free()
    }

    /// Number of state entries
    fn states_len(&self) -> usize {
        self.state_dim * self.nodes
    }

    /// Number of control entries
    fn controls_len(&self) -> usize {
        self.control_dim * self.nodes
    }

    /// Length of the decision vector
    pub fn len(&self) -> usize {
        self.states_len() + self.controls_len() + usize::from(self.free_final_time())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits `w` into N+1 states (the first one being `x0`), N controls and the final time.
    ///
    /// A free final time is returned as is: its positivity is one of the inequality constraints.
    pub fn decode(&self, w: &DVector<f64>, x0: &DVector<f64>) -> Result<DecodedGuess, OcpError> {
        ensure!(
            self.nodes > 0,
            InvalidConfigSnafu {
                msg: "at least one shooting interval is needed"
            }
        );
        ensure!(
            w.len() == self.len(),
            DecisionVectorLengthSnafu {
                expected: self.len(),
                got: w.len()
            }
        );
        ensure!(
            x0.len() == self.state_dim,
            InitialStateDimensionSnafu {
                expected: self.state_dim,
                got: x0.len()
            }
        );

        let mut states = Vec::with_capacity(self.nodes + 1);
        states.push(x0.clone());
        for i in 0..self.nodes {
            states.push(DVector::from_column_slice(
                &w.as_slice()[i * self.state_dim..(i + 1) * self.state_dim],
            ));
        }

        let offset = self.states_len();
        let controls = (0..self.nodes)
            .map(|i| {
                let start = offset + i * self.control_dim;
                DVector::from_column_slice(&w.as_slice()[start..start + self.control_dim])
            })
            .collect();

        let final_time = match self.final_time {
            FinalTime::Fixed(tf) => tf,
            FinalTime::Free => w[self.len() - 1],
        };

        Ok(DecodedGuess {
            states,
            controls,
            final_time,
        })
    }

    /// Packs a guess into a decision vector, dropping the initial state.
    pub fn encode(&self, guess: &DecodedGuess) -> Result<DVector<f64>, OcpError> {
        ensure!(
            guess.states.len() == self.nodes + 1,
            GridDimensionSnafu {
                what: "state grid",
                expected: self.nodes + 1,
                got: guess.states.len()
            }
        );
        ensure!(
            guess.controls.len() == self.nodes,
            GridDimensionSnafu {
                what: "control grid",
                expected: self.nodes,
                got: guess.controls.len()
            }
        );

        let mut w = DVector::zeros(self.len());
        for (i, state) in guess.states.iter().enumerate().skip(1) {
            ensure!(
                state.len() == self.state_dim,
                GridDimensionSnafu {
                    what: "state",
                    expected: self.state_dim,
                    got: state.len()
                }
            );
            w.rows_mut((i - 1) * self.state_dim, self.state_dim)
                .copy_from(state);
        }

        let offset = self.states_len();
        for (i, control) in guess.controls.iter().enumerate() {
            ensure!(
                control.len() == self.control_dim,
                GridDimensionSnafu {
                    what: "control",
                    expected: self.control_dim,
                    got: control.len()
                }
            );
            w.rows_mut(offset + i * self.control_dim, self.control_dim)
                .copy_from(control);
        }

        if self.free_final_time() {
            let last = self.len() - 1;
            w[last] = guess.final_time;
        }

        Ok(w)
    }

    /// All ones over the states and controls, and the default guess of a free final time.
    pub fn initial_guess(&self) -> DVector<f64> {
        let mut w = DVector::from_element(self.len(), 1.0);
        if self.free_final_time() {
            let last = self.len() - 1;
            w[last] = FREE_FINAL_TIME_GUESS;
        }
        w
    }
}

/// States, controls and final time unpacked from a decision vector.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedGuess {
    /// N+1 states, the first one is the initial state
    pub states: Vec<DVector<f64>>,
    /// N controls, held constant over each interval
    pub controls: Vec<DVector<f64>>,
    pub final_time: f64,
}

impl DecodedGuess {
    pub fn nodes(&self) -> usize {
        self.controls.len()
    }

    /// Duration of each shooting interval
    pub fn interval_length(&self) -> f64 {
        self.final_time / (self.nodes() as f64)
    }

    /// Time of node `i`, i.e. `i·tf/N`
    pub fn node_time(&self, i: usize) -> f64 {
        (i as f64) * self.interval_length()
    }

    /// Control applied at node `i`, the terminal node reuses the control of the last interval.
    pub fn node_control(&self, i: usize) -> &DVector<f64> {
        &self.controls[i.min(self.nodes() - 1)]
    }

    pub fn final_state(&self) -> &DVector<f64> {
        &self.states[self.nodes()]
    }
}
