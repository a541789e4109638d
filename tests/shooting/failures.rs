extern crate nyx_ocp as nyx;

use nyx::linalg::DVector;
use nyx::opti::auglag::status;
use nyx::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn infeasible_terminal_constraints() {
    crate::init_logger();

    // x(tf) = 0 and x(tf) = 1 cannot both hold
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, u, _t| u[0].powi(2))
        .with_terminal_eq(|x, _tf| DVector::from_vec(vec![x[0], x[0] - 1.0]));

    let opts = ShootingOpts::builder().nodes(4).build();
    let ocp = MultipleShooting::new(problem, DVector::from_vec(vec![1.0]), opts).unwrap();
    let solver = AugmentedLagrangian::new(SolverOpts::builder().max_outer_iterations(3).build());

    let err = ocp.solve(&solver).unwrap_err();
    println!("{err}");
    assert_eq!(err.status(), Some(status::MAX_ITERATIONS));

    match err {
        OcpError::NonConvergence { status: _, result } => {
            assert!(!result.converged());
            assert_eq!(result.states.len(), 5);
            assert_eq!(result.controls.len(), 4);
            assert_eq!(result.states[0][0], 1.0);
            // The diagnostic trajectory is still usable
            let xf = result.trajectory.state_at(1.0).unwrap();
            assert!(xf[0].is_finite());
            // The best compromise sits near x(tf) = 1/2
            assert!((result.states[4][0] - 0.5).abs() < 0.1);
        }
        other => panic!("expected a non-convergence, got {other:?}"),
    }
}

#[test]
fn non_finite_dynamics_abort_the_solve() {
    let problem = ProblemDefinition::new(
        1,
        1,
        |_x, _u, _t| DVector::from_vec(vec![f64::NAN]),
        |_x, u, _t| u[0].powi(2),
    );
    let ocp = MultipleShooting::new(
        problem,
        DVector::from_vec(vec![0.0]),
        ShootingOpts::default(),
    )
    .unwrap();

    let err = ocp.solve(&AugmentedLagrangian::default()).unwrap_err();
    assert!(
        matches!(err, OcpError::Integration { interval: 0, .. }),
        "{err:?}"
    );
    assert!(err.is_numerical());
    assert_eq!(err.status(), None);
}

#[test]
fn constraint_size_change_during_solve() {
    let calls = AtomicUsize::new(0);
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, u, _t| u[0].powi(2))
        .with_path_ineq(move |_x, u| {
            if calls.fetch_add(1, Ordering::Relaxed) < 100 {
                DVector::from_vec(vec![u[0] - 10.0])
            } else {
                DVector::from_vec(vec![u[0] - 10.0, -u[0] - 10.0])
            }
        });

    let opts = ShootingOpts::builder().nodes(4).build();
    let ocp = MultipleShooting::new(problem, DVector::from_vec(vec![1.0]), opts).unwrap();

    match ocp.solve(&AugmentedLagrangian::default()) {
        Err(OcpError::ConstraintDimension {
            function,
            expected,
            got,
        }) => {
            assert_eq!(function, "path inequality");
            assert_eq!(expected, 1);
            assert_eq!(got, 2);
        }
        other => panic!("expected a dimension error, got {other:?}"),
    }
}

#[test]
fn invalid_setup() {
    let err = MultipleShooting::new(
        crate::double_integrator(),
        DVector::zeros(3),
        ShootingOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        OcpError::InitialStateDimension {
            expected: 2,
            got: 3
        }
    ));

    for opts in [
        ShootingOpts::builder().nodes(0).build(),
        ShootingOpts::builder()
            .final_time(FinalTime::Fixed(-1.0))
            .build(),
        ShootingOpts::builder().fine_steps(0).build(),
    ] {
        let err =
            MultipleShooting::new(crate::single_integrator(), DVector::zeros(1), opts).unwrap_err();
        println!("{err}");
        assert!(matches!(err, OcpError::InvalidConfig { .. }));
    }

    let err = MultipleShooting::new(
        crate::single_integrator(),
        DVector::from_vec(vec![f64::INFINITY]),
        ShootingOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, OcpError::InvalidConfig { .. }));

    let ocp = MultipleShooting::new(
        crate::single_integrator(),
        DVector::from_vec(vec![1.0]),
        ShootingOpts::default(),
    )
    .unwrap();
    let dbg = format!("{ocp:?}");
    assert!(dbg.starts_with("MultipleShooting"), "{dbg}");
    assert!(dbg.contains("ProblemDefinition"), "{dbg}");
}

/// Returns the initial guess with the free final time overwritten and a fixed status.
struct FixedOutcome {
    final_time: f64,
    status: i32,
}

impl NlpSolver for FixedOutcome {
    fn minimize<N: NlpProblem + ?Sized>(
        &self,
        _problem: &N,
        x0: DVector<f64>,
    ) -> Result<NlpSolution, OcpError> {
        let mut x = x0;
        let last = x.len() - 1;
        x[last] = self.final_time;
        Ok(NlpSolution {
            x,
            objective: 0.0,
            status: self.status,
            iterations: 0,
            max_violation: 1.0,
        })
    }
}

fn free_time_single_integrator() -> MultipleShooting<ProblemDefinition> {
    let opts = ShootingOpts::builder()
        .nodes(4)
        .final_time(FinalTime::Free)
        .build();
    MultipleShooting::new(crate::single_integrator(), DVector::from_vec(vec![1.0]), opts).unwrap()
}

#[test]
fn status_survives_an_unusable_last_iterate() {
    crate::init_logger();

    let ocp = free_time_single_integrator();
    let solver = FixedOutcome {
        final_time: -1.0,
        status: status::MAX_ITERATIONS,
    };

    let err = ocp.solve(&solver).unwrap_err();
    println!("{err}");
    assert_eq!(err.status(), Some(status::MAX_ITERATIONS));
    match err {
        OcpError::NonConvergenceRaw {
            status,
            solution,
            source,
        } => {
            assert_eq!(status, status::MAX_ITERATIONS);
            assert_eq!(solution.x[ocp.layout().len() - 1], -1.0);
            assert!(
                matches!(*source, OcpError::Reconstruction { .. }),
                "{source:?}"
            );
        }
        other => panic!("expected a raw non-convergence, got {other:?}"),
    }
}

#[test]
fn status_is_kept_with_a_usable_last_iterate() {
    let ocp = free_time_single_integrator();
    let solver = FixedOutcome {
        final_time: 3.0,
        status: status::LINE_SEARCH_FAILURE,
    };

    match ocp.solve(&solver) {
        Err(OcpError::NonConvergence { status, result }) => {
            assert_eq!(status, status::LINE_SEARCH_FAILURE);
            assert_eq!(result.status, status::LINE_SEARCH_FAILURE);
            assert_eq!(result.final_time(), 3.0);
            assert_eq!(result.time_grid.len(), 5);
        }
        other => panic!("expected a non-convergence, got {other:?}"),
    }
}
