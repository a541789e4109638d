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

use crate::linalg::DVector;
use std::fmt;

/// A trait for optimal control problems in Bolza form.
///
/// Every function must be pure and return vectors whose size does not change between calls:
/// the transcription fixes the constraint sizes at the first evaluation.
///
/// Only the dynamics and the running cost are required. The terminal cost defaults to zero and
/// every constraint defaults to an empty vector.
pub trait BolzaProblem: Send + Sync {
    /// Dimension of the state vector
    fn state_dim(&self) -> usize;

    /// Dimension of the control vector
    fn control_dim(&self) -> usize;

    /// Equations of motion, returns the time derivative of the state.
    fn dynamics(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DVector<f64>;

    /// Lagrange term, integrated over each shooting interval.
    fn running_cost(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> f64;

    /// Mayer term, evaluated on the final state at the final time.
    fn terminal_cost(&self, _x: &DVector<f64>, _tf: f64) -> f64 {
        0.0
    }

    /// Path equality constraints, `g(x, u) = 0` at every shooting node.
    fn path_eq(&self, _x: &DVector<f64>, _u: &DVector<f64>) -> DVector<f64> {
        DVector::zeros(0)
    }

    /// Path inequality constraints, `h(x, u) <= 0` at every shooting node.
    fn path_ineq(&self, _x: &DVector<f64>, _u: &DVector<f64>) -> DVector<f64> {
        DVector::zeros(0)
    }

    /// Terminal equality constraints, `q(x_f, t_f) = 0`.
    fn terminal_eq(&self, _x: &DVector<f64>, _tf: f64) -> DVector<f64> {
        DVector::zeros(0)
    }

    /// Terminal inequality constraints, `r(x_f, t_f) <= 0`.
    fn terminal_ineq(&self, _x: &DVector<f64>, _tf: f64) -> DVector<f64> {
        DVector::zeros(0)
    }
}

type StageFn<T> = Box<dyn Fn(&DVector<f64>, &DVector<f64>, f64) -> T + Send + Sync>;
type PathFn = Box<dyn Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64> + Send + Sync>;
type TerminalFn<T> = Box<dyn Fn(&DVector<f64>, f64) -> T + Send + Sync>;

/// A problem definition built from closures.
///
/// ```
/// use nyx_ocp::prelude::*;
///
/// let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, u, _t| u.norm_squared())
///     .with_terminal_eq(|x, _tf| x.clone())
///     .with_path_ineq(|_x, u| DVector::from_vec(vec![u[0] - 2.0]));
///
/// assert_eq!(problem.path_ineq(&DVector::zeros(1), &DVector::zeros(1)).len(), 1);
/// assert_eq!(problem.path_eq(&DVector::zeros(1), &DVector::zeros(1)).len(), 0);
/// ```
pub struct ProblemDefinition {
    state_dim: usize,
    control_dim: usize,
    dynamics: StageFn<DVector<f64>>,
    running_cost: StageFn<f64>,
    terminal_cost: Option<TerminalFn<f64>>,
    path_eq: Option<PathFn>,
    path_ineq: Option<PathFn>,
    terminal_eq: Option<TerminalFn<DVector<f64>>>,
    terminal_ineq: Option<TerminalFn<DVector<f64>>>,
}

impl ProblemDefinition {
    /// Initializes a new problem with the required dynamics and running cost.
    pub fn new<F, L>(state_dim: usize, control_dim: usize, dynamics: F, running_cost: L) -> Self
    where
        F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
        L: Fn(&DVector<f64>, &DVector<f64>, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            state_dim,
            control_dim,
            dynamics: Box::new(dynamics),
            running_cost: Box::new(running_cost),
            terminal_cost: None,
            path_eq: None,
            path_ineq: None,
            terminal_eq: None,
            terminal_ineq: None,
        }
    }

    /// Sets the Mayer term `M(x_f, t_f)`, added once to the integrated running cost.
    pub fn with_terminal_cost<M>(mut self, terminal_cost: M) -> Self
    where
        M: Fn(&DVector<f64>, f64) -> f64 + Send + Sync + 'static,
    {
        self.terminal_cost = Some(Box::new(terminal_cost));
        self
    }

    /// Sets the path equalities `g(x, u) = 0`, enforced at every shooting node.
    pub fn with_path_eq<G>(mut self, path_eq: G) -> Self
    where
        G: Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64> + Send + Sync + 'static,
    {
        self.path_eq = Some(Box::new(path_eq));
        self
    }

    /// Sets the path inequalities `h(x, u) <= 0`, enforced at every shooting node.
    pub fn with_path_ineq<H>(mut self, path_ineq: H) -> Self
    where
        H: Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64> + Send + Sync + 'static,
    {
        self.path_ineq = Some(Box::new(path_ineq));
        self
    }

    /// Sets the terminal equalities `q(x_f, t_f) = 0`.
    pub fn with_terminal_eq<Q>(mut self, terminal_eq: Q) -> Self
    where
        Q: Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
    {
        self.terminal_eq = Some(Box::new(terminal_eq));
        self
    }

    /// Sets the terminal inequalities `r(x_f, t_f) <= 0`.
    pub fn with_terminal_ineq<R>(mut self, terminal_ineq: R) -> Self
    where
        R: Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
    {
        self.terminal_ineq = Some(Box::new(terminal_ineq));
        self
    }
}

impl BolzaProblem for ProblemDefinition {
    fn state_dim(&self) -> usize {
        self.state_dim
    }

    fn control_dim(&self) -> usize {
        self.control_dim
    }

    fn dynamics(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DVector<f64> {
        (self.dynamics)(x, u, t)
    }

    fn running_cost(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> f64 {
        (self.running_cost)(x, u, t)
    }

    fn terminal_cost(&self, x: &DVector<f64>, tf: f64) -> f64 {
        match &self.terminal_cost {
            Some(m) => m(x, tf),
            None => 0.0,
        }
    }

    fn path_eq(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        match &self.path_eq {
            Some(g) => g(x, u),
            None => DVector::zeros(0),
        }
    }

    fn path_ineq(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        match &self.path_ineq {
            Some(h) => h(x, u),
            None => DVector::zeros(0),
        }
    }

    fn terminal_eq(&self, x: &DVector<f64>, tf: f64) -> DVector<f64> {
        match &self.terminal_eq {
            Some(q) => q(x, tf),
            None => DVector::zeros(0),
        }
    }

    fn terminal_ineq(&self, x: &DVector<f64>, tf: f64) -> DVector<f64> {
        match &self.terminal_ineq {
            Some(r) => r(x, tf),
            None => DVector::zeros(0),
        }
    }
}

impl fmt::Debug for ProblemDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ProblemDefinition")
            .field("state_dim", &self.state_dim)
            .field("control_dim", &self.control_dim)
            .field("terminal_cost", &self.terminal_cost.is_some())
            .field("path_eq", &self.path_eq.is_some())
            .field("path_ineq", &self.path_ineq.is_some())
            .field("terminal_eq", &self.terminal_eq.is_some())
            .field("terminal_ineq", &self.terminal_ineq.is_some())
            .finish()
    }
}

impl fmt::Display for ProblemDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Bolza problem with {} states and {} controls",
            self.state_dim, self.control_dim
        )
    }
}

#[test]
fn test_defaults_are_empty() {
    let problem = ProblemDefinition::new(2, 1, |x, _u, _t| -x, |_x, u, _t| u[0].powi(2));
    let x = DVector::from_vec(vec![1.0, 2.0]);
    let u = DVector::from_vec(vec![0.5]);

    assert_eq!(problem.dynamics(&x, &u, 0.0), DVector::from_vec(vec![-1.0, -2.0]));
    assert!((problem.running_cost(&x, &u, 0.0) - 0.25).abs() < f64::EPSILON);
    assert!(problem.terminal_cost(&x, 1.0).abs() < f64::EPSILON);
    assert!(problem.path_eq(&x, &u).is_empty());
    assert!(problem.path_ineq(&x, &u).is_empty());
    assert!(problem.terminal_eq(&x, 1.0).is_empty());
    assert!(problem.terminal_ineq(&x, 1.0).is_empty());
}

#[test]
fn test_closures_are_used() {
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, _u, _t| 0.0)
        .with_terminal_cost(|x, tf| x[0] + tf)
        .with_path_eq(|x, u| DVector::from_vec(vec![x[0] - u[0]]))
        .with_terminal_ineq(|x, _tf| DVector::from_vec(vec![x[0], -x[0]]));

    let x = DVector::from_vec(vec![3.0]);
    let u = DVector::from_vec(vec![1.0]);

    assert!((problem.terminal_cost(&x, 2.0) - 5.0).abs() < f64::EPSILON);
    assert_eq!(problem.path_eq(&x, &u), DVector::from_vec(vec![2.0]));
    assert_eq!(problem.terminal_ineq(&x, 2.0).len(), 2);
    println!("{problem}\n{problem:?}");
}

#[test]
fn test_builders_set_their_own_function() {
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, _u, _t| 0.0)
        .with_path_ineq(|_x, u| DVector::from_vec(vec![u[0] - 1.0]))
        .with_terminal_eq(|x, tf| DVector::from_vec(vec![x[0] - tf]));

    let x = DVector::from_vec(vec![3.0]);
    let u = DVector::from_vec(vec![0.5]);

    // Satisfied inequalities are non-positive
    assert_eq!(problem.path_ineq(&x, &u), DVector::from_vec(vec![-0.5]));
    assert_eq!(problem.terminal_eq(&x, 3.0), DVector::from_vec(vec![0.0]));
    assert!(problem.path_eq(&x, &u).is_empty());
    assert!(problem.terminal_ineq(&x, 3.0).is_empty());
    assert!(problem.terminal_cost(&x, 3.0).abs() < f64::EPSILON);
}
