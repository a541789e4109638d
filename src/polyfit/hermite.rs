/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2021 Christopher Rabotin <christopher.rabotin@gmail.com>

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

use super::polynomial::Polynomial;
use super::{InterpolationError, InvalidInterpolationDataSnafu};
use snafu::ensure;

/// Builds the Hermite interpolant matching the values and first derivatives at every abscissa,
/// from Newton's divided differences with each abscissa repeated twice.
///
/// `DEGREE` is the number of coefficients of the result and must be at least twice the number of
/// samples. The abscissas must be distinct.
///
/// ```
/// use nyx_ocp::polyfit::hermite;
///
/// let xs: Vec<_> = (0..4).map(|i| i as f64).collect();
/// let ys: Vec<_> = xs.iter().map(|x| x.cos()).collect();
/// let derivs: Vec<_> = xs.iter().map(|x| -x.sin()).collect();
///
/// let poly = hermite::<8>(&xs, &ys, &derivs).unwrap();
///
/// println!("{:x}", poly);
/// ```
pub fn hermite<const DEGREE: usize>(
    xs: &[f64],
    ys: &[f64],
    derivs: &[f64],
) -> Result<Polynomial<DEGREE>, InterpolationError> {
    ensure!(
        !xs.is_empty(),
        InvalidInterpolationDataSnafu {
            msg: "No X data to interpolate"
        }
    );
    ensure!(
        xs.len() == ys.len() && xs.len() == derivs.len(),
        InvalidInterpolationDataSnafu {
            msg: format!(
                "{} abscissas, {} values and {} derivatives",
                xs.len(),
                ys.len(),
                derivs.len()
            )
        }
    );
    let n = 2 * xs.len();
    ensure!(
        DEGREE >= n,
        InvalidInterpolationDataSnafu {
            msg: format!(
                "{} samples need {n} coefficients but only {DEGREE} are available",
                xs.len()
            )
        }
    );
    ensure!(
        xs.windows(2).all(|w| w[0] != w[1]),
        InvalidInterpolationDataSnafu {
            msg: "Abscissas must be distinct"
        }
    );

    // Nodes repeated twice, divided differences computed in place
    let zs: Vec<f64> = xs.iter().flat_map(|x| [*x, *x]).collect();
    let mut dd: Vec<f64> = ys.iter().flat_map(|y| [*y, *y]).collect();
    for level in 1..n {
        for i in (level..n).rev() {
            dd[i] = if level == 1 && i % 2 == 1 {
                derivs[i / 2]
            } else {
                (dd[i] - dd[i - 1]) / (zs[i] - zs[i - level])
            };
        }
    }

    // Expand the Newton form into monomials
    let mut poly = Polynomial::<DEGREE>::zeros();
    for i in (0..n).rev() {
        if i + 1 < n {
            poly.mul_linear(zs[i]);
        }
        poly += dd[i];
    }

    ensure!(
        poly.is_finite(),
        InvalidInterpolationDataSnafu {
            msg: format!("Invalid interpolation {poly:x}")
        }
    );

    Ok(poly)
}
