extern crate nyx_ocp as nyx;

use nyx::prelude::*;
use rstest::*;

#[rstest]
#[case("nodes: 5\nfinal_time: Free\nmethod: Euler\n", 5, FinalTime::Free, IntegrationMethod::Euler)]
#[case("final_time: !Fixed 2.5\nparallel: true\n", 10, FinalTime::Fixed(2.5), IntegrationMethod::RK4)]
#[case("{}", 10, FinalTime::Fixed(1.0), IntegrationMethod::RK4)]
fn shooting_opts_from_yaml(
    #[case] yaml: &str,
    #[case] nodes: usize,
    #[case] final_time: FinalTime,
    #[case] method: IntegrationMethod,
) {
    let opts: ShootingOpts = serde_yaml::from_str(yaml).unwrap();
    println!("{opts}");
    assert_eq!(opts.nodes, nodes);
    assert_eq!(opts.final_time, final_time);
    assert_eq!(opts.method, method);
    assert_eq!(opts.fine_steps, 20);
    assert!(opts.validate().is_ok());
}

#[test]
fn invalid_yaml_options_are_caught_by_validation() {
    let opts: ShootingOpts = serde_yaml::from_str("nodes: 0").unwrap();
    assert!(opts.validate().is_err());
    assert!(matches!(
        MultipleShooting::new(crate::single_integrator(), DVector::zeros(1), opts),
        Err(OcpError::InvalidConfig { .. })
    ));
}

#[test]
fn solver_opts_yaml() {
    let opts = SolverOpts::builder()
        .max_outer_iterations(20)
        .tolerance(1e-10)
        .verbose(true)
        .build();
    let yaml = serde_yaml::to_string(&opts).unwrap();
    println!("{yaml}");
    let reloaded: SolverOpts = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reloaded, opts);

    let partial: SolverOpts = serde_yaml::from_str("fd_step: 1.0e-5\nmax_penalty: 1.0e8").unwrap();
    assert_eq!(partial.fd_step, 1e-5);
    assert_eq!(partial.max_penalty, 1e8);
    assert_eq!(partial.max_outer_iterations, 50);
}
