extern crate nyx_ocp as nyx;

use nyx::linalg::DVector;
use nyx::opti::NlpProblem;
use nyx::problem::ProblemDefinition;
use nyx::propagators::IntegrationMethod;
use nyx::transcription::{DecisionLayout, FinalTime, Transcription};
use nyx::OcpError;
use rstest::*;

#[fixture]
fn problem() -> ProblemDefinition {
    ProblemDefinition::new(
        2,
        1,
        |x, u, _t| DVector::from_vec(vec![x[1], u[0] - x[0]]),
        |x, u, _t| x.norm_squared() + u[0].powi(2),
    )
    .with_terminal_cost(|x, tf| x[0] * tf)
    .with_path_eq(|x, u| DVector::from_vec(vec![x[0] + u[0]]))
    .with_path_ineq(|x, u| DVector::from_vec(vec![x[1] - 10.0, u[0] - 5.0]))
    .with_terminal_eq(|x, _tf| DVector::from_vec(vec![x[0] - 1.0, x[1]]))
    .with_terminal_ineq(|x, tf| DVector::from_vec(vec![x[0] - tf]))
}

#[rstest]
fn constraint_lengths_are_invariant(problem: ProblemDefinition) {
    let nodes = 6;
    let x0 = DVector::from_vec(vec![0.0, 0.0]);
    let layout = DecisionLayout::new(2, 1, nodes, FinalTime::Free);
    let nlp = Transcription::new(
        &problem,
        x0,
        layout,
        IntegrationMethod::RK4.integrator(),
        false,
    )
    .unwrap();

    let eq_len = (nodes + 1) + 2 + 2 * nodes;
    let ineq_len = 2 * (nodes + 1) + 1 + 1;
    assert_eq!(nlp.constraint_layout().eq_len(), eq_len);
    assert_eq!(nlp.constraint_layout().ineq_len(), ineq_len);

    for k in 0..5 {
        let mut w = DVector::from_fn(layout.len(), |i, _| ((i + k) as f64 * 0.37).cos());
        let tf = 1.0 + k as f64;
        w[layout.len() - 1] = tf;

        let cons = nlp.constraints(&w).unwrap();
        assert_eq!(cons.eq.len(), eq_len);
        assert_eq!(cons.ineq.len(), ineq_len);
        // Free final time positivity is the very last inequality
        assert_eq!(cons.ineq[ineq_len - 1], -tf);

        assert!(nlp.objective(&w).unwrap().is_finite());
    }
}

#[rstest]
fn defects_vanish_on_a_simulated_guess(problem: ProblemDefinition) {
    let nodes = 5;
    let tf = 2.0;
    let x0 = DVector::from_vec(vec![0.5, -0.5]);
    let layout = DecisionLayout::new(2, 1, nodes, FinalTime::Fixed(tf));
    let integrator = IntegrationMethod::RK4.integrator();
    let nlp = Transcription::new(&problem, x0.clone(), layout, integrator, true).unwrap();

    // Build a guess by simulating each interval with one step
    let mut guess = nlp.decode(&layout.initial_guess()).unwrap();
    let h = tf / nodes as f64;
    let f = |x: &DVector<f64>, u: &DVector<f64>, _t: f64| {
        DVector::from_vec(vec![x[1], u[0] - x[0]])
    };
    for i in 0..nodes {
        guess.controls[i] = DVector::from_vec(vec![0.1 * i as f64]);
        guess.states[i + 1] = integrator
            .step(&f, &guess.states[i], &guess.controls[i], i as f64 * h, h)
            .unwrap();
    }
    let w = layout.encode(&guess).unwrap();

    assert!(nlp.max_defect(&nlp.decode(&w).unwrap()).unwrap() < 1e-15);
    let cons = nlp.constraints(&w).unwrap();
    let defects = cons.eq.rows(cons.eq.len() - 2 * nodes, 2 * nodes);
    assert!(defects.amax() < 1e-15);
}

#[test]
fn changing_constraint_size_is_rejected() {
    let problem = ProblemDefinition::new(1, 1, |_x, u, _t| u.clone(), |_x, _u, _t| 0.0)
        .with_path_eq(|x, _u| {
            if x[0] > 2.0 {
                DVector::zeros(3)
            } else {
                DVector::zeros(1)
            }
        });
    let layout = DecisionLayout::new(1, 1, 4, FinalTime::Fixed(1.0));
    let nlp = Transcription::new(
        &problem,
        DVector::from_vec(vec![0.0]),
        layout,
        IntegrationMethod::Euler.integrator(),
        false,
    )
    .unwrap();

    assert!(nlp.constraints(&layout.initial_guess()).is_ok());

    let mut w = layout.initial_guess();
    w[2] = 3.0;
    match nlp.constraints(&w) {
        Err(OcpError::ConstraintDimension {
            function,
            expected,
            got,
        }) => {
            assert_eq!(function, "path equality");
            assert_eq!(expected, 1);
            assert_eq!(got, 3);
        }
        other => panic!("expected a dimension error, got {other:?}"),
    }
}

#[test]
fn non_finite_dynamics_are_numeric_errors() {
    let problem = ProblemDefinition::new(1, 1, |_x, _u, _t| DVector::from_vec(vec![f64::NAN]), |_x, _u, _t| 0.0);
    let layout = DecisionLayout::new(1, 1, 3, FinalTime::Fixed(1.0));
    let nlp = Transcription::new(
        &problem,
        DVector::from_vec(vec![0.0]),
        layout,
        IntegrationMethod::RK4.integrator(),
        false,
    )
    .unwrap();

    let err = nlp.constraints(&layout.initial_guess()).unwrap_err();
    assert!(matches!(err, OcpError::Integration { interval: 0, .. }));
    assert!(err.is_numerical());
    assert!(nlp.objective(&layout.initial_guess()).is_err());
}

#[rstest]
fn transcription_without_intervals_is_rejected(problem: ProblemDefinition) {
    let nlp = Transcription::new(
        &problem,
        DVector::zeros(2),
        DecisionLayout::new(2, 1, 0, FinalTime::Fixed(1.0)),
        IntegrationMethod::RK4.integrator(),
        false,
    );
    match nlp.err() {
        Some(OcpError::InvalidConfig { msg }) => println!("{msg}"),
        other => panic!("expected an invalid configuration, got {other:?}"),
    }
}
