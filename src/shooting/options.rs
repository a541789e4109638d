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

use crate::errors::InvalidConfigSnafu;
use crate::propagators::IntegrationMethod;
use crate::transcription::FinalTime;
use crate::OcpError;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// ShootingOpts stores the transcription options: the number of shooting intervals, the final
/// time, the integration method and how finely to re-simulate the solution.
///
/// The defects use a single step of the integrator per interval, the returned trajectory uses
/// `fine_steps` steps per interval.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
#[serde(default)]
pub struct ShootingOpts {
    /// Number of shooting intervals
    #[builder(default = 10)]
    pub nodes: usize,
    #[builder(default = FinalTime::Fixed(1.0))]
    pub final_time: FinalTime,
    #[builder(default)]
    pub method: IntegrationMethod,
    #[builder(default = 20)]
    pub fine_steps: usize,
    /// Evaluate the defects of all intervals in parallel
    #[builder(default = false)]
    pub parallel: bool,
}

impl ShootingOpts {
    pub fn validate(&self) -> Result<(), OcpError> {
        ensure!(
            self.nodes > 0,
            InvalidConfigSnafu {
                msg: "at least one shooting interval is needed"
            }
        );
        if let FinalTime::Fixed(tf) = self.final_time {
            ensure!(
                tf.is_finite() && tf > 0.0,
                InvalidConfigSnafu {
                    msg: format!("fixed final time must be positive and finite, got {tf}")
                }
            );
        }
        ensure!(
            self.fine_steps > 0,
            InvalidConfigSnafu {
                msg: "at least one fine step per interval is needed"
            }
        );
        Ok(())
    }
}

impl Default for ShootingOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for ShootingOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} intervals, {}, {} ({} fine steps{})",
            self.nodes,
            self.final_time,
            self.method,
            self.fine_steps,
            if self.parallel { ", parallel" } else { "" }
        )
    }
}

#[test]
fn test_validate() {
    assert!(ShootingOpts::default().validate().is_ok());
    assert!(ShootingOpts::builder().nodes(0).build().validate().is_err());
    assert!(ShootingOpts::builder()
        .final_time(FinalTime::Fixed(0.0))
        .build()
        .validate()
        .is_err());
    assert!(ShootingOpts::builder()
        .final_time(FinalTime::Fixed(f64::NAN))
        .build()
        .validate()
        .is_err());
    assert!(ShootingOpts::builder()
        .final_time(FinalTime::Free)
        .fine_steps(0)
        .build()
        .validate()
        .is_err());
    println!("{}", ShootingOpts::default());
}
