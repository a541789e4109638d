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

use crate::polyfit::InterpolationError;
use crate::propagators::IntegrationError;
use snafu::prelude::*;

mod traj;
mod traj_it;

pub use traj::{TrajSample, Trajectory};
pub use traj_it::TrajIterator;

#[derive(Clone, PartialEq, Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TrajError {
    #[snafu(display("Requested t = {t} outside of the trajectory span [0, {tf}]"))]
    OutOfRange { t: f64, tf: f64 },
    #[snafu(display("Failed to create trajectory: {msg}"))]
    CreationError { msg: String },
    #[snafu(display("Sampling step must be positive and finite, got {step}"))]
    InvalidStep { step: f64 },
    #[snafu(display("Interpolation failed: {source}"))]
    Interpolation { source: InterpolationError },
    #[snafu(display("Re-simulation of interval #{interval} failed: {source}"))]
    Propagation {
        interval: usize,
        source: IntegrationError,
    },
}
