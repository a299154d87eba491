//! Shared helpers for integration tests
#![allow(dead_code)]

use firecast_core::{SimulationConfig, SimulationParameters, SimulationRunner};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Active-front threshold used for centroids
pub const ACTIVE: f64 = 0.1;

/// The reference scenario: calm, flat, two hours at (38.5, -121.5)
pub fn concrete_scenario() -> SimulationParameters {
    SimulationParameters::from_json(
        r#"{
            "temperature": 75, "humidity": 30, "moisture": 15,
            "windSpeed": 0, "windDirection": "N", "slope": 0,
            "duration": 2, "originLatitude": 38.5, "originLongitude": -121.5
        }"#,
    )
    .expect("scenario parses")
}

/// Mean final `(row, col)` burn centroid over one run per seed
pub fn mean_final_centroid(params: &SimulationParameters, seeds: &[u64]) -> (f64, f64) {
    let runner = SimulationRunner::new(SimulationConfig::default());
    let centroids: Vec<(f64, f64)> = runner
        .run_ensemble(params, seeds)
        .into_iter()
        .map(|outcome| {
            outcome
                .expect("run succeeds")
                .final_field
                .burn_centroid(ACTIVE)
                .expect("fire still burning")
        })
        .collect();
    let n = centroids.len() as f64;
    let row = centroids.iter().map(|c| c.0).sum::<f64>() / n;
    let col = centroids.iter().map(|c| c.1).sum::<f64>() / n;
    (row, col)
}
