use lvsweep::core::{Coefficients, SimulationSettings, State, run, run_with};

#[test]
fn zero_rates_leave_state_unchanged() {
    let s0 = State::new(1.7, 0.3);
    let t = run(s0, &Coefficients::zero(), 5_000).unwrap();
    assert_eq!(t.len(), 5_001);
    assert!(t.states().iter().all(|&s| s == s0));
}

#[test]
fn length_is_steps_plus_one_and_head_is_exact() {
    let s0 = State::new(0.1 + 0.2, 1.0 / 3.0);
    let c = Coefficients::new(0.7, 0.2, 0.5, 0.9);
    for n in [0usize, 1, 17, 1_000] {
        let t = run(s0, &c, n).unwrap();
        assert_eq!(t.len(), n + 1, "n={n}");
        assert_eq!(t.first().x.to_bits(), s0.x.to_bits());
        assert_eq!(t.first().y.to_bits(), s0.y.to_bits());
    }
}

#[test]
fn identical_inputs_give_identical_trajectories() {
    let s0 = State::new(1.3, 0.8);
    let c = Coefficients::new(0.61, 0.42, 0.33, 0.24);
    let settings = SimulationSettings {
        sample_stride: 7,
        ..SimulationSettings::full(20_000, 1e-4)
    };
    let a = run_with(s0, &c, &settings, None).unwrap();
    let b = run_with(s0, &c, &settings, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn near_fixed_point_stays_put() {
    let s0 = State::new(1.0, 1.0);
    let t = run(s0, &Coefficients::new(0.1, 0.1, 0.1, 0.1), 1_000).unwrap();
    let end = t.last();
    assert!((end.x - 1.0).abs() < 0.01, "x={}", end.x);
    assert!((end.y - 1.0).abs() < 0.01, "y={}", end.y);
}

#[test]
fn each_state_is_one_step_from_the_previous() {
    let c = Coefficients::new(0.9, 0.4, 0.3, 0.6);
    let t = run(State::new(0.8, 1.2), &c, 500).unwrap();
    for pair in t.states().windows(2) {
        assert_eq!(pair[1], lvsweep::core::step(pair[0], &c, 1e-5));
    }
}
