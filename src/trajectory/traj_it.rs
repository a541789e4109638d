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

use super::{TrajSample, Trajectory};

/// Iterates through a trajectory with a fixed step, from zero up to and including the final time.
pub struct TrajIterator<'a> {
    /// A shared pointer to the original trajectory.
    pub traj: &'a Trajectory,
    pub step: f64,
    pub(crate) k: usize,
    pub(crate) done: bool,
}

impl Iterator for TrajIterator<'_> {
    type Item = TrajSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tf = self.traj.final_time();
        let mut t = (self.k as f64) * self.step;
        self.k += 1;
        if t >= tf {
            t = tf;
            self.done = true;
        }

        match self.traj.at(t) {
            Ok(sample) => Some(sample),
            Err(e) => {
                let msg = format!("!!! [BUG] TrajIterator: {e} but should be present in {}", self.traj);
                if log_enabled!(log::Level::Error) {
                    error!("{msg}");
                } else {
                    eprintln!("{msg}");
                };
                None
            }
        }
    }
}
