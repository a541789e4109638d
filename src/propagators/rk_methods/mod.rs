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

/// The `RK` trait defines an explicit Runge Kutta integrator by its Butcher table.
#[allow(clippy::upper_case_acronyms)]
pub trait RK
where
    Self: Sized,
{
    /// Returns the order of this integrator (as u8 because there probably isn't an order greater than 255).
    const ORDER: u8;

    /// Returns the stages of this integrator (as usize because it's used as indexing)
    const STAGES: usize;

    /// Returns a pointer to a list of f64 corresponding to the A coefficients of the Butcher table for that RK.
    /// Only the strictly lower triangular part is stored, row by row, so `A_COEFFS.len()` must be
    /// STAGES*(STAGES-1)/2.
    /// *Warning:* this RK trait supposes that the implementation is consistent, i.e. c_i = \sum_j a_{ij}.
    const A_COEFFS: &'static [f64];

    /// Returns a pointer to a list of f64 corresponding to the b_i coefficients of the Butcher table,
    /// of size STAGES. These weights are also the quadrature weights of the running cost.
    const B_COEFFS: &'static [f64];
}

/// Forward Euler is the explicit [first order method](https://en.wikipedia.org/wiki/Euler_method).
/// Paired with the running cost, its weights are the left rectangle rule.
pub struct Euler {}

impl RK for Euler {
    const ORDER: u8 = 1;
    const STAGES: usize = 1;
    const A_COEFFS: &'static [f64] = &[];
    const B_COEFFS: &'static [f64] = &[1.0];
}

/// RK4Fixed is the classical fourth order [Runge Kutta](https://en.wikipedia.org/wiki/Runge%E2%80%93Kutta_methods) method.
/// Paired with the running cost, its weights are Simpson's rule with the midpoint evaluated twice.
pub struct RK4Fixed {}

impl RK for RK4Fixed {
    const ORDER: u8 = 4;
    const STAGES: usize = 4;
    const A_COEFFS: &'static [f64] = &[0.5, 0.0, 0.5, 0.0, 0.0, 1.0];
    const B_COEFFS: &'static [f64] = &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];
}

#[cfg(test)]
fn check_tableau<T: RK>() {
    assert_eq!(T::A_COEFFS.len(), T::STAGES * (T::STAGES - 1) / 2);
    assert_eq!(T::B_COEFFS.len(), T::STAGES);
    let sum_b: f64 = T::B_COEFFS.iter().sum();
    assert!((sum_b - 1.0).abs() < 1e-15, "weights must sum to one");
}

#[test]
fn test_tableaus_consistent() {
    check_tableau::<Euler>();
    check_tableau::<RK4Fixed>();
}
