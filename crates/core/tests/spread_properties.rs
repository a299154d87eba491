//! Run-level invariants of the spread model
//!
//! Bounds, history length, grid shape and fuel monotonicity must hold for
//! every run, including ones with out-of-range parameters.

mod common;

use approx::assert_abs_diff_eq;
use common::concrete_scenario;
use firecast_core::{
    SimError, Simulation, SimulationConfig, SimulationParameters, SimulationRunner,
};

fn extreme_parameters() -> Vec<SimulationParameters> {
    vec![
        SimulationParameters::default(),
        SimulationParameters::default().with_wind(95.0, "SW").with_slope(45.0),
        SimulationParameters::default().with_wind(-40.0, "E").with_slope(-30.0),
        SimulationParameters::default().with_wind(250.0, "bogus").with_slope(80.0),
        SimulationParameters {
            humidity: 140.0,
            moisture: -5.0,
            temperature: f64::NAN,
            ..SimulationParameters::default()
        },
    ]
}

#[test]
fn test_bounds_hold_every_step() {
    for (i, params) in extreme_parameters().into_iter().enumerate() {
        let params = params.with_duration(12);
        let mut sim = Simulation::new(&params, &SimulationConfig::seeded(i as u64)).unwrap();
        while sim.step().is_some() {
            let field = sim.field();
            assert!(
                field.intensity().as_slice().iter().all(|v| (0.0..=1.0).contains(v)),
                "intensity out of bounds for case {i}"
            );
            assert!(
                field.fuel().as_slice().iter().all(|v| (0.0..=1.0).contains(v)),
                "fuel out of bounds for case {i}"
            );
        }
    }
}

#[test]
fn test_history_length_is_two_frames_per_hour() {
    let runner = SimulationRunner::new(SimulationConfig::seeded(11));
    for hours in [1, 2, 5] {
        let params = SimulationParameters::default().with_duration(hours);
        let history = runner.run(&params).unwrap();
        assert_eq!(history.len(), hours as usize * 2);
    }
}

#[test]
fn test_grid_shape_is_fixed() {
    for params in extreme_parameters() {
        let params = params.with_duration(1);
        let mut sim = Simulation::new(&params, &SimulationConfig::seeded(3)).unwrap();
        sim.run_to_end();
        let field = sim.field();
        assert_eq!(field.size(), 200);
        assert_eq!(field.intensity().width, 200);
        assert_eq!(field.fuel().height, 200);
    }
}

#[test]
fn test_fuel_never_increases() {
    let params = SimulationParameters::default()
        .with_wind(30.0, "NE")
        .with_duration(10);
    let mut sim = Simulation::new(&params, &SimulationConfig::seeded(21)).unwrap();
    let mut previous = sim.field().fuel().clone();
    while sim.step().is_some() {
        let fuel = sim.field().fuel();
        for (before, after) in previous.as_slice().iter().zip(fuel.as_slice()) {
            assert!(after <= before, "fuel rose from {before} to {after}");
        }
        previous = fuel.clone();
    }
}

#[test]
fn test_non_positive_duration_is_rejected() {
    let runner = SimulationRunner::new(SimulationConfig::seeded(1));
    for duration in [0, -1, -48] {
        let params = SimulationParameters::default().with_duration(duration);
        let result = runner.run(&params);
        assert!(
            matches!(result, Err(SimError::InvalidDuration(d)) if d == duration),
            "duration {duration} was accepted"
        );
    }
}

#[test]
fn test_concrete_scenario() {
    let params = concrete_scenario();
    let config = SimulationConfig::seeded(2024);
    let mut sim = Simulation::new(&params, &config).unwrap();
    let (min_lat, max_lat, min_lon, max_lon) = sim.exporter().grid_bounds(200);
    sim.run_to_end();
    let history = sim.into_history();

    assert_eq!(history.len(), 4);

    let first = &history.frames()[0];
    assert!(!first.is_empty());
    let reach = 3.0 * 0.004 + 1e-9;
    for point in first {
        assert!((point.latitude - 38.5).abs() <= reach, "{point:?}");
        assert!((point.longitude + 121.5).abs() <= reach, "{point:?}");
    }

    let eps = 1e-9;
    for frame in &history {
        for point in frame {
            assert!(point.latitude >= min_lat - eps && point.latitude <= max_lat + eps);
            assert!(point.longitude >= min_lon - eps && point.longitude <= max_lon + eps);
            assert!(point.intensity > 0.05 && point.intensity <= 1.0);
        }
    }
}

#[test]
fn test_unresolved_direction_matches_calm() {
    let unresolved = SimulationParameters::default()
        .with_wind(80.0, "XYZ")
        .with_duration(4);
    let calm = SimulationParameters::default()
        .with_wind(0.0, "N")
        .with_duration(4);
    let runner = SimulationRunner::new(SimulationConfig::default());

    let a = runner.run_seeded(&unresolved, 99).unwrap();
    let b = runner.run_seeded(&calm, 99).unwrap();
    assert_eq!(a.history, b.history);
    assert_eq!(a.final_field, b.final_field);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let params = SimulationParameters::default().with_duration(3);
    let runner = SimulationRunner::new(SimulationConfig::seeded(5));
    assert_eq!(runner.run(&params).unwrap(), runner.run(&params).unwrap());
}

#[test]
fn test_full_field_export_keeps_every_burning_cell() {
    let params = SimulationParameters::default().with_duration(1);
    let config = SimulationConfig::seeded(8).without_downsampling();
    let mut sim = Simulation::new(&params, &config).unwrap();
    let exported = sim.step().map(|frame| frame.len()).unwrap();
    assert_eq!(exported, sim.field().burned_area(0.05));

    let peak = sim.history().frames()[0].peak_intensity().unwrap();
    assert_abs_diff_eq!(peak, 0.98, epsilon = 0.005);
}
