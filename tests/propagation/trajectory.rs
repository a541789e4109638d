extern crate nyx_ocp as nyx;

use nyx::linalg::DVector;
use nyx::problem::ProblemDefinition;
use nyx::propagators::IntegrationMethod;
use nyx::trajectory::{TrajError, Trajectory};

#[test]
fn traj_exponential_growth() {
    crate::init_logger();

    // ẋ = u x with piecewise constant u
    let problem = ProblemDefinition::new(1, 1, |x, u, _t| x * u[0], |_x, _u, _t| 0.0);
    let controls = vec![DVector::from_vec(vec![1.0]), DVector::from_vec(vec![-1.0])];
    let states = vec![
        DVector::from_vec(vec![1.0]),
        DVector::from_vec(vec![1.0_f64.exp()]),
        DVector::from_vec(vec![1.0]),
    ];

    let traj = Trajectory::reconstruct(
        &problem,
        &states,
        &controls,
        2.0,
        IntegrationMethod::RK4.integrator(),
        50,
    )
    .unwrap();

    assert_eq!(traj.node_times(), &[0.0, 1.0, 2.0]);
    for sample in traj.every(0.05).unwrap() {
        let expected = if sample.t <= 1.0 {
            sample.t.exp()
        } else {
            (2.0 - sample.t).exp()
        };
        assert!(
            (sample.state[0] - expected).abs() < 1e-6,
            "t = {}: {} != {expected}",
            sample.t,
            sample.state[0]
        );
    }

    // The control is linear between the interval starts, then flat over the last interval
    assert!((traj.control_at(0.25).unwrap()[0] - 0.5).abs() < 1e-15);
    assert_eq!(traj.control_at(1.5).unwrap()[0], -1.0);
}

#[test]
fn traj_out_of_range() {
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, _u, _t| 0.0);
    let states = vec![DVector::zeros(1); 4];
    let controls = vec![DVector::zeros(1); 3];
    let traj = Trajectory::reconstruct(
        &problem,
        &states,
        &controls,
        3.0,
        IntegrationMethod::Euler.integrator(),
        2,
    )
    .unwrap();

    assert!(traj.state_at(3.0).is_ok());
    assert!(matches!(
        traj.state_at(3.5),
        Err(TrajError::OutOfRange { .. })
    ));
    assert!(matches!(
        traj.control_at(-1.0),
        Err(TrajError::OutOfRange { .. })
    ));
    assert!(traj.at(f64::NAN).is_err());
}

#[test]
fn traj_non_finite_dynamics() {
    let problem = ProblemDefinition::new(
        1,
        1,
        |x, _u, t| {
            if t > 0.5 {
                DVector::from_vec(vec![f64::INFINITY])
            } else {
                x.clone()
            }
        },
        |_x, _u, _t| 0.0,
    );
    let states = vec![DVector::zeros(1); 3];
    let controls = vec![DVector::zeros(1); 2];
    let err = Trajectory::reconstruct(
        &problem,
        &states,
        &controls,
        2.0,
        IntegrationMethod::RK4.integrator(),
        4,
    )
    .unwrap_err();
    assert!(matches!(err, TrajError::Propagation { interval: 0, .. }));
}
