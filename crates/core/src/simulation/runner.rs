//! Whole-run drivers
//!
//! [`SimulationRunner`] holds a configuration and runs it to completion. It
//! carries no per-run state, so one runner can serve many concurrent
//! requests: each run owns its own random source and buffers.

use super::config::SimulationConfig;
use super::field_simulation::{RunOutcome, Simulation};
use crate::core_types::{History, SimulationParameters};
use crate::error::{SimError, SimResult};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Runs simulations to completion with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Configuration used for every run
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run to completion and return one frame per timestep.
    ///
    /// The history holds exactly `duration × steps_per_hour` frames.
    pub fn run(&self, params: &SimulationParameters) -> SimResult<History> {
        self.run_detailed(params).map(|outcome| outcome.history)
    }

    /// Run to completion, also returning the final field and statistics.
    pub fn run_detailed(&self, params: &SimulationParameters) -> SimResult<RunOutcome> {
        let mut sim = Simulation::new(params, &self.config)?;
        sim.run_to_end();
        Ok(sim.finish())
    }

    /// Run with an explicit seed, overriding the configured one.
    pub fn run_seeded(&self, params: &SimulationParameters, seed: u64) -> SimResult<RunOutcome> {
        let config = self.config.clone().with_seed(seed);
        let mut sim = Simulation::new(params, &config)?;
        sim.run_to_end();
        Ok(sim.finish())
    }

    /// Run until finished or until `cancel` is raised.
    ///
    /// The flag is checked before every step; a raised flag discards the
    /// partial history and returns [`SimError::Cancelled`].
    pub fn run_with_cancel(
        &self,
        params: &SimulationParameters,
        cancel: &AtomicBool,
    ) -> SimResult<History> {
        let mut sim = Simulation::new(params, &self.config)?;
        while !sim.is_finished() {
            if cancel.load(Ordering::Relaxed) {
                warn!(
                    "Simulation cancelled after {} of {} steps",
                    sim.steps_completed(),
                    sim.total_steps()
                );
                return Err(SimError::Cancelled {
                    completed_steps: sim.steps_completed(),
                    total_steps: sim.total_steps(),
                });
            }
            sim.step();
        }
        Ok(sim.into_history())
    }

    /// Run one independent simulation per seed in parallel.
    ///
    /// Results come back in seed order. Each run is exactly what
    /// [`run_seeded`](Self::run_seeded) would produce for its seed.
    pub fn run_ensemble(
        &self,
        params: &SimulationParameters,
        seeds: &[u64],
    ) -> Vec<SimResult<RunOutcome>> {
        info!("Running ensemble of {} simulations", seeds.len());
        seeds
            .par_iter()
            .map(|&seed| self.run_seeded(params, seed))
            .collect()
    }
}
