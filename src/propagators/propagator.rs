/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2022 Christopher Rabotin <christopher.rabotin@gmail.com>

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

use super::{
    DerivativeDimensionSnafu, IntegrationError, IntegrationMethod, InvalidStepSnafu,
    NonFiniteSnafu, RK,
};
use crate::linalg::DVector;
use snafu::ensure;

/// A fixed step integrator, storing the coefficients of its Butcher table.
///
/// The control is held constant over every step, the time is only passed through to the dynamics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Integrator {
    pub method: IntegrationMethod,
    order: u8,     // Order of the integrator
    stages: usize, // Number of stages, i.e. how many times the derivatives will be called
    a_coeffs: &'static [f64],
    b_coeffs: &'static [f64],
}

impl Integrator {
    /// Each integrator must be initialized with `new` which stores the Butcher table.
    pub fn new<T: RK>(method: IntegrationMethod) -> Self {
        Self {
            method,
            order: T::ORDER,
            stages: T::STAGES,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn stages(&self) -> usize {
        self.stages
    }

    /// Performs a single step of size `h` from `x` at time `t` with the control `u`.
    pub fn step<F>(
        &self,
        f: &F,
        x: &DVector<f64>,
        u: &DVector<f64>,
        t: f64,
        h: f64,
    ) -> Result<DVector<f64>, IntegrationError>
    where
        F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64> + ?Sized,
    {
        let (next, _) = self.advance(|xi: &DVector<f64>, ti: f64| (f(xi, u, ti), 0.0), x, t, h)?;
        Ok(next)
    }

    /// Performs a single step and integrates the running cost `l` over it, evaluating it at the
    /// same stages as the dynamics and weighting it with the same coefficients.
    pub fn step_with_quadrature<F, L>(
        &self,
        f: &F,
        l: &L,
        x: &DVector<f64>,
        u: &DVector<f64>,
        t: f64,
        h: f64,
    ) -> Result<(DVector<f64>, f64), IntegrationError>
    where
        F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64> + ?Sized,
        L: Fn(&DVector<f64>, &DVector<f64>, f64) -> f64 + ?Sized,
    {
        self.advance(
            |xi: &DVector<f64>, ti: f64| (f(xi, u, ti), l(xi, u, ti)),
            x,
            t,
            h,
        )
    }

    /// Simulates `steps` steps over `interval` from `x_start`, returning all of the states,
    /// the first one being `x_start`.
    pub fn simulate<F>(
        &self,
        f: &F,
        x_start: &DVector<f64>,
        u: &DVector<f64>,
        t_start: f64,
        interval: f64,
        steps: usize,
    ) -> Result<Vec<DVector<f64>>, IntegrationError>
    where
        F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64> + ?Sized,
    {
        ensure!(
            steps > 0 && interval.is_finite() && interval > 0.0,
            InvalidStepSnafu { steps, interval }
        );

        let h = interval / (steps as f64);
        let mut states = Vec::with_capacity(steps + 1);
        states.push(x_start.clone());
        for k in 0..steps {
            let next = self.step(f, &states[k], u, t_start + (k as f64) * h, h)?;
            states.push(next);
        }
        Ok(states)
    }

    /// Evaluates all of the stages and returns the next state and the weighted sum of the
    /// scalar returned alongside each derivative.
    fn advance<S>(
        &self,
        stage_eval: S,
        x: &DVector<f64>,
        t: f64,
        h: f64,
    ) -> Result<(DVector<f64>, f64), IntegrationError>
    where
        S: Fn(&DVector<f64>, f64) -> (DVector<f64>, f64),
    {
        let dim = x.len();
        let mut k: Vec<DVector<f64>> = Vec::with_capacity(self.stages);
        let mut q: Vec<f64> = Vec::with_capacity(self.stages);
        let mut a_idx: usize = 0;

        for _ in 0..self.stages {
            let mut ci = 0.0;
            let mut xi = x.clone();
            for kj in &k {
                let a_ij = self.a_coeffs[a_idx];
                a_idx += 1;
                ci += a_ij;
                if a_ij.abs() > 0.0 {
                    xi.axpy(h * a_ij, kj, 1.0);
                }
            }
            let ti = t + ci * h;
            let (ki, qi) = stage_eval(&xi, ti);
            ensure!(
                ki.len() == dim,
                DerivativeDimensionSnafu {
                    expected: dim,
                    got: ki.len()
                }
            );
            ensure!(
                ki.iter().all(|v| v.is_finite()) && qi.is_finite(),
                NonFiniteSnafu { t: ti }
            );
            k.push(ki);
            q.push(qi);
        }

        let mut next = x.clone();
        let mut quadrature = 0.0;
        for ((ki, qi), bi) in k.iter().zip(q.iter()).zip(self.b_coeffs.iter()) {
            next.axpy(h * bi, ki, 1.0);
            quadrature += h * bi * qi;
        }

        ensure!(next.iter().all(|v| v.is_finite()), NonFiniteSnafu { t: t + h });

        Ok((next, quadrature))
    }
}
