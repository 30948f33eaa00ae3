use lvsweep::core::{Coefficients, SimulationSettings, State};
use lvsweep::sampler::SweepRange;
use lvsweep::sweep::{Coefficient, SweepAxis, run_sweep};

#[test]
fn labels_follow_value_order() {
    let values = vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    let axis = SweepAxis::coefficient(Coefficient::Delta, values);
    let out = run_sweep(
        &axis,
        &Coefficients::new(0.5, 0.4, 0.3, 0.2),
        State::new(1.0, 1.0),
        &SimulationSettings::full(100, 1e-3),
    )
    .unwrap();

    let labels: Vec<&str> = out.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "δ = 0.00", "δ = 0.20", "δ = 0.40", "δ = 0.60", "δ = 0.80", "δ = 1.00"
        ]
    );
    for entry in &out {
        assert_eq!(entry.trajectory.len(), 101);
    }
}

#[test]
fn reference_range_drives_six_runs() {
    let values = SweepRange::default().values().unwrap();
    let axis = SweepAxis::coefficient(Coefficient::Alpha, values);
    let out = run_sweep(
        &axis,
        &Coefficients::new(0.5, 0.4, 0.3, 0.2),
        State::new(1.0, 1.0),
        &SimulationSettings::full(10, 1e-3),
    )
    .unwrap();
    assert_eq!(out.len(), 6);
    assert_eq!(out[0].label, "α = 0.00");
    assert_eq!(out[5].label, "α = 1.00");
}

#[test]
fn diverged_runs_are_still_returned() {
    let axis = SweepAxis::coefficient(Coefficient::Alpha, vec![0.5, 1e3]);
    let out = run_sweep(
        &axis,
        &Coefficients::new(0.5, 1e3, 1e3, 1e3),
        State::new(5.0, 5.0),
        &SimulationSettings::full(2_000, 1.0),
    )
    .unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|e| !e.trajectory.is_finite()));
    assert_eq!(out[1].label, "α = 1000.00");
}
