extern crate nyx_ocp as nyx;

use nyx::linalg::DVector;
use nyx::transcription::{DecisionLayout, FinalTime};
use nyx::OcpError;
use rstest::*;

#[rstest]
#[case(FinalTime::Fixed(2.5))]
#[case(FinalTime::Free)]
fn codec_round_trip(#[case] final_time: FinalTime) {
    let layout = DecisionLayout::new(3, 2, 7, final_time);
    let x0 = DVector::from_vec(vec![0.1, 0.2, 0.3]);
    let w = DVector::from_fn(layout.len(), |i, _| (i as f64).sin() + 0.5 * i as f64);

    let guess = layout.decode(&w, &x0).unwrap();
    assert_eq!(guess.states.len(), 8);
    assert_eq!(guess.controls.len(), 7);
    assert_eq!(guess.states[0], x0);
    match final_time {
        FinalTime::Fixed(tf) => assert_eq!(guess.final_time, tf),
        FinalTime::Free => assert_eq!(guess.final_time, w[w.len() - 1]),
    }

    assert_eq!(layout.encode(&guess).unwrap(), w);
}

#[rstest]
#[case(FinalTime::Fixed(1.0), 27)]
#[case(FinalTime::Free, 28)]
fn codec_rejects_wrong_length(#[case] final_time: FinalTime, #[case] expected: usize) {
    let layout = DecisionLayout::new(2, 1, 9, final_time);
    assert_eq!(layout.len(), expected);

    let x0 = DVector::zeros(2);
    for len in [expected - 1, expected + 1] {
        match layout.decode(&DVector::zeros(len), &x0) {
            Err(OcpError::DecisionVectorLength { expected: e, got }) => {
                assert_eq!(e, expected);
                assert_eq!(got, len);
            }
            other => panic!("expected a length error, got {other:?}"),
        }
    }
}
