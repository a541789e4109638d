extern crate nyx_ocp as nyx;

use nyx::linalg::DVector;
use nyx::prelude::*;
use rstest::*;

#[rstest]
#[case(IntegrationMethod::Euler)]
#[case(IntegrationMethod::RK4)]
fn single_integrator_min_energy(#[case] method: IntegrationMethod) {
    crate::init_logger();

    let opts = ShootingOpts::builder().nodes(10).method(method).build();
    let ocp =
        MultipleShooting::new(crate::single_integrator(), DVector::from_vec(vec![1.0]), opts)
            .unwrap();

    let sol = ocp.solve(&AugmentedLagrangian::default()).unwrap();
    println!("{sol}");

    assert!(sol.converged());
    assert!(sol.max_defect < 1e-6, "max defect {:e}", sol.max_defect);
    assert!((sol.cost - 1.0).abs() < 1e-4, "cost = {}", sol.cost);
    for u in &sol.controls {
        assert!((u[0] + 1.0).abs() < 1e-4, "u = {}", u[0]);
    }

    // Optimal state is linear from 1 to 0
    assert_eq!(sol.time_grid.len(), 11);
    assert_eq!(sol.time_grid[10], 1.0);
    for (t, x) in sol.time_grid.iter().zip(sol.states.iter()) {
        assert!((x[0] - (1.0 - t)).abs() < 1e-4);
    }

    // The trajectory goes through every shooting node
    for (i, t) in sol.trajectory.node_times().iter().enumerate() {
        let x = sol.trajectory.state_at(*t).unwrap();
        assert!((&x - &sol.states[i]).amax() < 1e-6);
    }
}

#[test]
fn double_integrator_rest_to_rest() {
    crate::init_logger();

    let opts = ShootingOpts::builder()
        .nodes(10)
        .fine_steps(10)
        .parallel(true)
        .build();
    let ocp =
        MultipleShooting::new(crate::double_integrator(), DVector::zeros(2), opts).unwrap();

    let sol = ocp.solve(&AugmentedLagrangian::default()).unwrap();
    println!("{sol}");

    // The continuous optimum is 12, the piecewise constant control costs a little more
    assert!((sol.cost - 12.0).abs() < 0.5, "cost = {}", sol.cost);
    assert!(sol.max_defect < 1e-6);

    let xf = sol.trajectory.state_at(1.0).unwrap();
    assert!((xf[0] - 1.0).abs() < 1e-5);
    assert!(xf[1].abs() < 1e-5);

    // Accelerate first, then brake
    assert!(sol.controls[0][0] > 0.0);
    assert!(sol.controls[9][0] < 0.0);

    let mut count = 0;
    for sample in sol.trajectory.every(0.01).unwrap() {
        assert!(sample.state.iter().all(|v| v.is_finite()));
        assert!(sample.control.iter().all(|v| v.is_finite()));
        count += 1;
    }
    assert_eq!(count, 101);
}

#[test]
fn free_final_time_from_terminal_cost() {
    crate::init_logger();

    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, _u, _t| 0.0)
        .with_terminal_cost(|_x, tf| (tf - 2.0).powi(2))
        .with_terminal_eq(|x, _tf| x.clone());

    let opts = ShootingOpts::builder()
        .nodes(5)
        .final_time(FinalTime::Free)
        .build();
    let ocp = MultipleShooting::new(problem, DVector::from_vec(vec![1.0]), opts).unwrap();
    assert_eq!(ocp.layout().len(), 11);

    let sol = ocp.solve(&AugmentedLagrangian::default()).unwrap();
    println!("{sol}");

    assert!((sol.final_time() - 2.0).abs() < 1e-3, "tf = {}", sol.final_time());
    assert_eq!(*sol.time_grid.last().unwrap(), sol.final_time());
    assert!(sol.states[5][0].abs() < 1e-6);
    assert!(sol.cost < 1e-6);
}

#[test]
fn inactive_path_inequality() {
    let problem = crate::single_integrator()
        .with_path_ineq(|_x, u| DVector::from_vec(vec![u[0] - 5.0, -u[0] - 5.0]));

    let opts = ShootingOpts::builder().nodes(8).build();
    let ocp = MultipleShooting::new(problem, DVector::from_vec(vec![1.0]), opts).unwrap();
    let nlp = ocp.transcription().unwrap();
    assert_eq!(nlp.constraint_layout().ineq_len(), 2 * 9);

    let sol = ocp.solve(&AugmentedLagrangian::default()).unwrap();
    assert!((sol.cost - 1.0).abs() < 1e-4, "cost = {}", sol.cost);
}

#[test]
fn custom_problem_type() {
    /// Scalar linear system with a quadratic regulator cost
    struct Regulator {
        a: f64,
    }

    impl BolzaProblem for Regulator {
        fn state_dim(&self) -> usize {
            1
        }

        fn control_dim(&self) -> usize {
            1
        }

        fn dynamics(&self, x: &DVector<f64>, u: &DVector<f64>, _t: f64) -> DVector<f64> {
            x * self.a + u
        }

        fn running_cost(&self, x: &DVector<f64>, u: &DVector<f64>, _t: f64) -> f64 {
            x.norm_squared() + u.norm_squared()
        }

        fn terminal_cost(&self, x: &DVector<f64>, _tf: f64) -> f64 {
            10.0 * x.norm_squared()
        }
    }

    let opts = ShootingOpts::builder().nodes(6).build();
    let ocp = MultipleShooting::new(Regulator { a: -0.5 }, DVector::from_vec(vec![2.0]), opts)
        .unwrap();
    let sol = ocp.solve(&AugmentedLagrangian::default()).unwrap();

    // The regulator drives the state toward zero with negative controls
    assert!(sol.states[6][0].abs() < sol.states[0][0].abs());
    assert!(sol.controls[0][0] < 0.0);
    // Letting the state decay freely costs about 17.2
    assert!(sol.cost > 0.0 && sol.cost < 15.0, "cost = {}", sol.cost);
}
