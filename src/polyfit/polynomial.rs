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

use std::fmt;
use std::ops;

/// A polynomial with a fixed number of coefficients, stored on the stack.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Polynomial<const SIZE: usize> {
    /// Coefficients by increasing power: index 0 is the constant term.
    pub coefficients: [f64; SIZE],
}

impl<const SIZE: usize> Polynomial<SIZE> {
    /// Builds a polynomial from its coefficients by decreasing power.
    pub fn from_most_significant(mut coeffs: [f64; SIZE]) -> Self {
        coeffs.reverse();
        Self {
            coefficients: coeffs,
        }
    }

    pub fn zeros() -> Self {
        Self {
            coefficients: [0.0; SIZE],
        }
    }

    /// Highest power with a non-zero coefficient, None for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.iter().rposition(|c| *c != 0.0)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).0
    }

    pub fn deriv(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).1
    }

    /// Evaluates the polynomial and its first derivative with a single Horner pass.
    pub fn eval_n_deriv(&self, x: f64) -> (f64, f64) {
        let mut value = 0.0;
        let mut slope = 0.0;
        for c in self.coefficients.iter().rev() {
            slope = slope * x + value;
            value = value * x + c;
        }
        (value, slope)
    }

    pub fn is_finite(&self) -> bool {
        self.coefficients.iter().all(|c| c.is_finite())
    }

    /// Multiplies in place by `(x - root)`. The leading coefficient must be zero for the product to fit.
    pub(crate) fn mul_linear(&mut self, root: f64) {
        let mut carry = 0.0;
        for c in self.coefficients.iter_mut() {
            let prev = *c;
            *c = carry - root * prev;
            carry = prev;
        }
    }

    fn fmt_with_var(&self, f: &mut fmt::Formatter, var: &str) -> fmt::Result {
        write!(f, "P({var}) =")?;
        for (power, c) in self.coefficients.iter().enumerate().rev() {
            if c.abs() <= f64::EPSILON {
                continue;
            }
            let sign = if *c > 0.0 { "+" } else { "" };
            if c.abs() > 100.0 || c.abs() < 0.01 {
                write!(f, " {sign}{c:e}")?;
            } else {
                write!(f, " {sign}{c}")?;
            }
            match power {
                0 => {}
                1 => write!(f, "{var}")?,
                _ => write!(f, "{var}^{power}")?,
            }
        }
        Ok(())
    }
}

impl<const SIZE: usize> ops::AddAssign<f64> for Polynomial<SIZE> {
    fn add_assign(&mut self, rhs: f64) {
        if let Some(c0) = self.coefficients.first_mut() {
            *c0 += rhs;
        }
    }
}

impl<const SIZE: usize> fmt::Display for Polynomial<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_var(f, "t")
    }
}

impl<const SIZE: usize> fmt::LowerHex for Polynomial<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_var(f, "x")
    }
}
