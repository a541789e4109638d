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
use snafu::prelude::*;
use std::fmt;

// Re-Export
mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;

/// Fixed step integration schemes available to simulate the shooting intervals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationMethod {
    /// Forward Euler, first order
    Euler,
    /// Classical Runge Kutta, fourth order
    #[default]
    RK4,
}

impl IntegrationMethod {
    /// Builds the integrator of this method.
    pub fn integrator(self) -> Integrator {
        match self {
            Self::Euler => Integrator::new::<Euler>(self),
            Self::RK4 => Integrator::new::<RK4Fixed>(self),
        }
    }

    /// Order of the local truncation error is this order plus one.
    pub fn order(self) -> u8 {
        match self {
            Self::Euler => Euler::ORDER,
            Self::RK4 => RK4Fixed::ORDER,
        }
    }
}

impl fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Euler => write!(f, "forward Euler"),
            Self::RK4 => write!(f, "RK4"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IntegrationError {
    #[snafu(display("non-finite state derivative or running cost at t = {t}"))]
    NonFinite { t: f64 },
    #[snafu(display("dynamics returned {got} derivatives for a state of dimension {expected}"))]
    DerivativeDimension { expected: usize, got: usize },
    #[snafu(display("cannot split an interval of {interval} in {steps} steps"))]
    InvalidStep { steps: usize, interval: f64 },
}
