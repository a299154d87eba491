//! Stepwise fire-spread run
//!
//! [`Simulation`] owns everything one run needs: its random source, the
//! spread engine over a freshly generated terrain, and the exporter that
//! turns each post-step field into a [`Frame`]. One call to
//! [`Simulation::step`] is one timestep and yields exactly one frame.

use super::config::SimulationConfig;
use super::frame_export::FrameExporter;
use crate::core_types::{Frame, History, SimRng, SimulationParameters};
use crate::error::SimResult;
use crate::grid::{CompassDirection, TerrainField, WindModel};
use crate::solver::{CombustionField, FrameTimer, ProfilerScope, SpreadEngine, StepStats};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Child stream offset for down-sampling draws
const EXPORT_STREAM: u64 = 1;

/// Frames preallocated up front; longer runs grow the history as they go
const MAX_PREALLOCATED_FRAMES: usize = 4096;

/// Aggregate statistics for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Steps applied
    pub steps: usize,
    /// Largest number of active fronts seen in any step
    pub peak_active_fronts: usize,
    /// Successful ignition trials over the whole run
    pub total_ignitions: usize,
    /// Cells above the active threshold at the end of the run
    pub final_burning_cells: usize,
    /// Mean wall-clock time per step (ms)
    pub mean_step_ms: f64,
    /// Slowest step (ms)
    pub slowest_step_ms: f64,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub history: History,
    pub final_field: CombustionField,
    pub summary: RunSummary,
}

/// A single run, advanced one timestep at a time.
pub struct Simulation {
    engine: SpreadEngine,
    exporter: FrameExporter,
    rng: SimRng,
    export_rng: SimRng,
    total_steps: usize,
    history: History,
    timer: FrameTimer,
    summary: RunSummary,
}

impl Simulation {
    /// Set up a run: validate, seed the random source, generate terrain,
    /// ignite the center and resolve the wind.
    ///
    /// Out-of-range parameters are logged and passed through unchanged; only
    /// a non-positive duration or an invalid config is rejected.
    pub fn new(params: &SimulationParameters, config: &SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let total_steps = config.total_steps(params.duration)?;

        for warning in params.out_of_range_warnings() {
            warn!("Parameter outside nominal range: {}", warning);
        }

        let mut rng = SimRng::from_seed_option(config.seed);
        // Derived before terrain so down-sampling never shifts the field
        let export_rng = rng.child(EXPORT_STREAM);

        let terrain = TerrainField::generate(config.grid_size, &config.terrain, &mut rng);
        let TerrainField { fuel, roughness } = terrain;

        let mut field = CombustionField::new(fuel);
        field.ignite_center(config.ignition_half_width);

        let wind = WindModel::resolve(
            &params.wind_direction,
            params.wind_speed,
            config.spread.wind_speed_scale,
        );
        let engine = SpreadEngine::new(
            field,
            roughness,
            wind,
            params.slope,
            config.spread.clone(),
        );
        let exporter = FrameExporter::new(
            params.origin_latitude,
            params.origin_longitude,
            config.grid_size / 2,
            config.export.clone(),
        );

        info!(
            "Simulation initialized: {}x{} grid, {} steps, wind={} at {:.1} mph (magnitude {:.2}), slope={:.1}°, seed={:?}",
            config.grid_size,
            config.grid_size,
            total_steps,
            wind.direction().map_or("none", CompassDirection::token),
            params.wind_speed,
            wind.magnitude(),
            params.slope,
            config.seed
        );

        Ok(Self {
            engine,
            exporter,
            rng,
            export_rng,
            total_steps,
            history: History::with_capacity(total_steps.min(MAX_PREALLOCATED_FRAMES)),
            timer: FrameTimer::new(),
            summary: RunSummary::default(),
        })
    }

    /// Apply one timestep and export its frame.
    ///
    /// Returns `None` once all steps have been applied.
    pub fn step(&mut self) -> Option<&Frame> {
        if self.is_finished() {
            return None;
        }

        let scope = ProfilerScope::new("simulation_step");
        let stats = self.engine.step(&mut self.rng);
        let frame = self.exporter.export(self.engine.field(), &mut self.export_rng);
        self.timer.record(scope.elapsed());
        drop(scope);

        self.record(stats);
        debug!(
            "Step {}/{}: {} active fronts, {} sources, {} ignitions, {} points exported ({:.2}ms)",
            self.steps_completed() + 1,
            self.total_steps,
            stats.active_fronts,
            stats.sources,
            stats.ignitions,
            frame.len(),
            self.timer.last_frame_time_ms()
        );

        self.history.push(frame);
        self.history.frames().last()
    }

    fn record(&mut self, stats: StepStats) {
        self.summary.peak_active_fronts = self.summary.peak_active_fronts.max(stats.active_fronts);
        self.summary.total_ignitions += stats.ignitions;
    }

    /// Apply every remaining step.
    pub fn run_to_end(&mut self) {
        while self.step().is_some() {}
    }

    /// Whether every step has been applied
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.steps_completed() >= self.total_steps
    }

    /// Steps applied so far
    #[must_use]
    pub fn steps_completed(&self) -> usize {
        self.history.len()
    }

    /// Steps the full run applies
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Current combustion field
    #[must_use]
    pub fn field(&self) -> &CombustionField {
        self.engine.field()
    }

    /// Spread engine, for inspecting the resolved wind and constants
    #[must_use]
    pub fn engine(&self) -> &SpreadEngine {
        &self.engine
    }

    /// Frame exporter in use
    #[must_use]
    pub fn exporter(&self) -> &FrameExporter {
        &self.exporter
    }

    /// Frames exported so far
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Step timing so far
    #[must_use]
    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Consume the run, returning its frames
    #[must_use]
    pub fn into_history(self) -> History {
        self.history
    }

    /// Consume the run, returning frames, final field and statistics.
    #[must_use]
    pub fn finish(self) -> RunOutcome {
        let threshold = self.engine.config().active_threshold;
        let summary = RunSummary {
            steps: self.history.len(),
            final_burning_cells: self.engine.field().burned_area(threshold),
            mean_step_ms: self.timer.mean_frame_time_ms(),
            slowest_step_ms: self.timer.slowest_frame_time_ms(),
            ..self.summary
        };
        info!(
            "Simulation finished: {} steps, peak {} active fronts, {} ignitions, {} cells burning, mean step {:.2}ms",
            summary.steps,
            summary.peak_active_fronts,
            summary.total_ignitions,
            summary.final_burning_cells,
            summary.mean_step_ms
        );
        RunOutcome {
            history: self.history,
            final_field: self.engine.into_field(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            grid_size: 40,
            ..SimulationConfig::seeded(seed)
        }
    }

    #[test]
    fn test_one_frame_per_step() {
        let params = SimulationParameters::default().with_duration(3);
        let mut sim = Simulation::new(&params, &small_config(1)).unwrap();
        assert_eq!(sim.total_steps(), 6);

        let mut frames = 0;
        while sim.step().is_some() {
            frames += 1;
        }
        assert_eq!(frames, 6);
        assert!(sim.is_finished());
        assert!(sim.step().is_none());
        assert_eq!(sim.into_history().len(), 6);
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        for duration in [0, -1] {
            let params = SimulationParameters::default().with_duration(duration);
            let result = Simulation::new(&params, &small_config(1));
            assert!(matches!(result, Err(SimError::InvalidDuration(d)) if d == duration));
        }
    }

    #[test]
    fn test_initial_field_is_seeded_at_center() {
        let params = SimulationParameters::default().with_duration(1);
        let sim = Simulation::new(&params, &small_config(2)).unwrap();
        assert_eq!(sim.field().burned_area(0.5), 25);
        assert_eq!(sim.field().intensity_at(20, 20), 1.0);
        assert_eq!(sim.steps_completed(), 0);
    }

    #[test]
    fn test_finish_reports_summary() {
        let params = SimulationParameters::default().with_duration(2);
        let mut sim = Simulation::new(&params, &small_config(3)).unwrap();
        sim.run_to_end();
        let outcome = sim.finish();
        assert_eq!(outcome.summary.steps, 4);
        assert_eq!(outcome.history.len(), 4);
        assert!(outcome.summary.peak_active_fronts >= 25);
        assert_eq!(outcome.final_field.size(), 40);
    }

    #[test]
    fn test_down_sampling_does_not_change_the_field() {
        let params = SimulationParameters::default().with_duration(4);
        let mut sampled = Simulation::new(&params, &small_config(9)).unwrap();
        let mut full = Simulation::new(&params, &small_config(9).without_downsampling()).unwrap();
        sampled.run_to_end();
        full.run_to_end();
        assert_eq!(sampled.field(), full.field());
        assert!(sampled.history().total_points() <= full.history().total_points());
    }
}
