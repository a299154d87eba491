//! Stochastic spread transition for the combustion grid.
//!
//! One call to [`SpreadEngine::step`] applies, in order:
//!
//! 1. **Consumption and decay**: burning cells (`intensity > 0.1`) lose
//!    `0.04 × intensity` fuel, the whole intensity field decays by `0.98`,
//!    and cells left with `fuel < 0.1` are further multiplied by `0.6`.
//! 2. **Source selection**: cells with `intensity > 0.1` are active fronts.
//!    If there are more than `max_active_fronts` (800 by default) a uniform
//!    subset of exactly that many is drawn without replacement.
//! 3. **Ignition trials**: each source tries every Moore neighbor that is in
//!    bounds, has `fuel >= 0.1` and is not already above `0.4`:
//!
//!    ```text
//!    p = min(1, base × (1/distance) × wind_boost × slope_boost × roughness)
//!    ```
//!
//!    A success sets the neighbor to `max(current, U(0.5, 0.8))`.
//! 4. **Clip**: intensity back into `[0, 1]`.
//!
//! Trials read the post-decay field and write into a back buffer with a
//! max-merge, so the order sources are visited in never changes the value a
//! cell ends up with for a given set of draws.

use super::fields::{CombustionField, FieldData};
use crate::core_types::SimRng;
use crate::error::{SimError, SimResult};
use crate::grid::WindModel;
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// Moore neighborhood offsets `(row delta, col delta)`
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Named constants of the spread transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Ignition probability for an orthogonal neighbor before any boost
    pub base_ignition_probability: f64,
    /// Intensity above which a cell burns fuel and acts as a source
    pub active_threshold: f64,
    /// Fuel consumed per step per unit intensity
    pub fuel_consumption_rate: f64,
    /// Uniform intensity decay factor per step
    pub decay_factor: f64,
    /// Fuel below which a cell is exhausted and cannot be ignited
    pub exhaustion_threshold: f64,
    /// Extra intensity multiplier for exhausted cells
    pub exhaustion_penalty: f64,
    /// Neighbors above this intensity are skipped as already burning
    pub saturation_threshold: f64,
    /// Range of the randomized intensity given to a newly ignited cell
    pub ignition_intensity: (f64, f64),
    /// Wind boost gain per unit alignment and magnitude
    pub wind_gain: f64,
    /// Wind speed (mph) giving magnitude 1.0
    pub wind_speed_scale: f64,
    /// Upslope boost gain per unit slope factor
    pub slope_gain: f64,
    /// Slope (degrees) giving slope factor 1.0
    pub slope_scale: f64,
    /// Cap on sources per step; `None` tries every active front
    pub max_active_fronts: Option<usize>,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            base_ignition_probability: 0.25,
            active_threshold: 0.1,
            fuel_consumption_rate: 0.04,
            decay_factor: 0.98,
            exhaustion_threshold: 0.1,
            exhaustion_penalty: 0.6,
            saturation_threshold: 0.4,
            ignition_intensity: (0.5, 0.8),
            wind_gain: 5.0,
            wind_speed_scale: 50.0,
            slope_gain: 2.0,
            slope_scale: 50.0,
            max_active_fronts: Some(800),
        }
    }
}

impl SpreadConfig {
    /// Reject constants that cannot produce a meaningful step.
    pub fn validate(&self) -> SimResult<()> {
        let (lo, hi) = self.ignition_intensity;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(SimError::InvalidConfig(format!(
                "ignition_intensity must be an ordered range within [0, 1], got ({lo}, {hi})"
            )));
        }
        if self.wind_speed_scale == 0.0 || self.slope_scale == 0.0 {
            return Err(SimError::InvalidConfig(
                "wind_speed_scale and slope_scale must be non-zero".to_string(),
            ));
        }
        if self.max_active_fronts == Some(0) {
            return Err(SimError::InvalidConfig(
                "max_active_fronts must be positive or unset".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-step counters, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Active fronts found after decay
    pub active_fronts: usize,
    /// Sources actually tried (after the cap)
    pub sources: usize,
    /// Successful ignition trials
    pub ignitions: usize,
}

/// The stochastic transition function over a [`CombustionField`].
pub struct SpreadEngine {
    field: CombustionField,
    // Back buffer for ignition trials (written, then swapped with intensity)
    intensity_back: FieldData,
    roughness: FieldData,
    wind: WindModel,
    slope_factor: f64,
    // base × (1/distance) × wind_boost × slope_boost for each Moore offset;
    // constant for the whole run
    offset_factors: [f64; 8],
    config: SpreadConfig,
    steps_taken: usize,
}

impl SpreadEngine {
    /// Create an engine over a seeded field and static roughness map.
    ///
    /// `slope_degrees` becomes `slope_factor = slope / slope_scale`; the
    /// wind model must already be resolved with the same config's scale.
    #[must_use]
    pub fn new(
        field: CombustionField,
        roughness: FieldData,
        wind: WindModel,
        slope_degrees: f64,
        config: SpreadConfig,
    ) -> Self {
        let slope_factor = slope_degrees / config.slope_scale;
        let offset_factors = NEIGHBOR_OFFSETS.map(|(dr, dc)| {
            let distance = if dr != 0 && dc != 0 { SQRT_2 } else { 1.0 };
            let wind_boost = wind.boost(dr, dc, config.wind_gain);
            // Row delta negative is the modeled uphill direction
            let slope_boost = if dr < 0 {
                1.0 + slope_factor * config.slope_gain
            } else {
                1.0
            };
            config.base_ignition_probability / distance * wind_boost * slope_boost
        });
        let intensity_back = FieldData::new(field.intensity.width, field.intensity.height);

        Self {
            field,
            intensity_back,
            roughness,
            wind,
            slope_factor,
            offset_factors,
            config,
            steps_taken: 0,
        }
    }

    /// Advance the field by one timestep.
    pub fn step(&mut self, rng: &mut SimRng) -> StepStats {
        self.consume_and_decay();

        let active = self.field.active_cells(self.config.active_threshold);
        let active_fronts = active.len();
        let sources = self.select_sources(active, rng);

        let ignitions = self.try_ignitions(&sources, rng);

        std::mem::swap(&mut self.field.intensity, &mut self.intensity_back);
        self.field.intensity.clip(0.0, 1.0);
        self.steps_taken += 1;

        StepStats {
            active_fronts,
            sources: sources.len(),
            ignitions,
        }
    }

    fn consume_and_decay(&mut self) {
        let cfg = &self.config;
        let intensity = self.field.intensity.as_mut_slice();
        let fuel = self.field.fuel.as_mut_slice();

        for (f, &i) in fuel.iter_mut().zip(intensity.iter()) {
            if i > cfg.active_threshold {
                *f -= cfg.fuel_consumption_rate * i;
            }
        }
        self.field.fuel.clip(0.0, 1.0);

        let fuel = self.field.fuel.as_slice();
        for (i, &f) in intensity.iter_mut().zip(fuel.iter()) {
            *i *= cfg.decay_factor;
            if f < cfg.exhaustion_threshold {
                *i *= cfg.exhaustion_penalty;
            }
        }
    }

    /// Apply the active-front cap.
    fn select_sources(&self, active: Vec<(usize, usize)>, rng: &mut SimRng) -> Vec<(usize, usize)> {
        match self.config.max_active_fronts {
            Some(cap) if active.len() > cap => {
                rand::seq::index::sample(rng.inner(), active.len(), cap)
                    .into_iter()
                    .map(|i| active[i])
                    .collect()
            }
            _ => active,
        }
    }

    fn try_ignitions(&mut self, sources: &[(usize, usize)], rng: &mut SimRng) -> usize {
        let cfg = &self.config;
        let (ign_lo, ign_hi) = cfg.ignition_intensity;
        let current = self.field.intensity.as_slice();
        let fuel = self.field.fuel.as_slice();
        let roughness = self.roughness.as_slice();

        self.intensity_back.as_mut_slice().copy_from_slice(current);
        let back = self.intensity_back.as_mut_slice();

        let mut ignitions = 0;
        for &(row, col) in sources {
            for (k, &(dr, dc)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                let nr = row as i64 + i64::from(dr);
                let nc = col as i64 + i64::from(dc);
                if !self.field.intensity.contains(nr, nc) {
                    continue;
                }
                let idx = self.field.intensity.index(nr as usize, nc as usize);
                if fuel[idx] < cfg.exhaustion_threshold
                    || current[idx] > cfg.saturation_threshold
                {
                    continue;
                }

                let raw = self.offset_factors[k] * roughness[idx];
                let probability = if raw.is_nan() { 0.0 } else { raw.min(1.0) };
                if rng.unit() < probability {
                    let candidate = rng.uniform(ign_lo, ign_hi);
                    back[idx] = back[idx].max(candidate);
                    ignitions += 1;
                }
            }
        }
        ignitions
    }

    /// Current combustion field
    #[must_use]
    pub fn field(&self) -> &CombustionField {
        &self.field
    }

    /// Static roughness map
    #[must_use]
    pub fn roughness(&self) -> &FieldData {
        &self.roughness
    }

    /// Resolved wind
    #[must_use]
    pub fn wind(&self) -> &WindModel {
        &self.wind
    }

    /// `slope / slope_scale`
    #[must_use]
    pub fn slope_factor(&self) -> f64 {
        self.slope_factor
    }

    /// Pre-roughness ignition probability factor for each Moore offset,
    /// in [`NEIGHBOR_OFFSETS`] order
    #[must_use]
    pub fn offset_factors(&self) -> &[f64; 8] {
        &self.offset_factors
    }

    /// Spread constants in use
    #[must_use]
    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Steps applied so far
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Consume the engine, returning the final field
    #[must_use]
    pub fn into_field(self) -> CombustionField {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_engine(size: usize, wind: WindModel, slope: f64, config: SpreadConfig) -> SpreadEngine {
        let mut field = CombustionField::new(FieldData::with_value(size, size, 1.0));
        field.ignite_center(2);
        SpreadEngine::new(
            field,
            FieldData::with_value(size, size, 1.0),
            wind,
            slope,
            config,
        )
    }

    fn assert_bounds(field: &CombustionField) {
        assert!(field.intensity().data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(field.fuel().data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_offset_factors_calm_flat() {
        let engine = uniform_engine(20, WindModel::calm(), 0.0, SpreadConfig::default());
        for (k, &(dr, dc)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            let expected = if dr != 0 && dc != 0 { 0.25 / SQRT_2 } else { 0.25 };
            assert_relative_eq!(engine.offset_factors()[k], expected);
        }
    }

    #[test]
    fn test_offset_factors_wind_and_slope() {
        let wind = WindModel::resolve("N", 50.0, 50.0);
        let engine = uniform_engine(20, wind, 25.0, SpreadConfig::default());
        assert_relative_eq!(engine.slope_factor(), 0.5);
        // (1, 0): downwind south, alignment 1, magnitude 1 -> boost 6
        assert_relative_eq!(engine.offset_factors()[6], 0.25 * 6.0);
        // (-1, 0): upwind gets no wind boost but the upslope boost 1 + 0.5*2
        assert_relative_eq!(engine.offset_factors()[1], 0.25 * 2.0);
        // (0, 1): crosswind, flat
        assert_relative_eq!(engine.offset_factors()[4], 0.25);
    }

    #[test]
    fn test_first_step_decay_and_consumption() {
        // Zero base probability isolates phase 1
        let config = SpreadConfig {
            base_ignition_probability: 0.0,
            ..SpreadConfig::default()
        };
        let mut engine = uniform_engine(20, WindModel::calm(), 0.0, config);
        let mut rng = SimRng::seeded(1);
        let stats = engine.step(&mut rng);

        assert_eq!(stats.active_fronts, 25);
        assert_eq!(stats.ignitions, 0);
        assert_relative_eq!(engine.field().intensity_at(10, 10), 0.98);
        assert_relative_eq!(engine.field().fuel_at(10, 10), 0.96);
        // Unburnt cells keep their fuel
        assert_eq!(engine.field().fuel_at(0, 0), 1.0);
    }

    #[test]
    fn test_exhausted_fuel_penalty() {
        let config = SpreadConfig {
            base_ignition_probability: 0.0,
            ..SpreadConfig::default()
        };
        let mut field = CombustionField::new(FieldData::with_value(5, 5, 0.12));
        field.intensity.set(2, 2, 1.0);
        let mut engine = SpreadEngine::new(
            field,
            FieldData::with_value(5, 5, 1.0),
            WindModel::calm(),
            0.0,
            config,
        );
        engine.step(&mut SimRng::seeded(1));
        // 0.12 - 0.04 = 0.08 < 0.1, so decay then penalty
        assert_relative_eq!(engine.field().fuel_at(2, 2), 0.08);
        assert_relative_eq!(engine.field().intensity_at(2, 2), 0.98 * 0.6);
    }

    #[test]
    fn test_certain_ignition_reaches_ring() {
        // Probability saturates at 1 so every eligible neighbor ignites
        let config = SpreadConfig {
            base_ignition_probability: 10.0,
            ..SpreadConfig::default()
        };
        let mut engine = uniform_engine(20, WindModel::calm(), 0.0, config);
        let stats = engine.step(&mut SimRng::seeded(2));

        // The 7x7 ring around the 5x5 seed is 24 cells
        assert_eq!(engine.field().burned_area(0.45), 49);
        assert!(stats.ignitions >= 24);
        for row in 7..=13 {
            for col in 7..=13 {
                let v = engine.field().intensity_at(row, col);
                assert!(v >= 0.5, "cell ({row},{col}) = {v}");
            }
        }
        assert_eq!(engine.field().intensity_at(6, 10), 0.0);
    }

    #[test]
    fn test_saturated_neighbors_are_skipped() {
        let config = SpreadConfig {
            base_ignition_probability: 10.0,
            ..SpreadConfig::default()
        };
        let mut engine = uniform_engine(20, WindModel::calm(), 0.0, config);
        engine.step(&mut SimRng::seeded(3));
        // Seed cells sat above 0.4 after decay and were never overwritten
        assert_relative_eq!(engine.field().intensity_at(10, 10), 0.98);
    }

    #[test]
    fn test_no_ignition_into_exhausted_fuel() {
        let config = SpreadConfig {
            base_ignition_probability: 10.0,
            ..SpreadConfig::default()
        };
        let mut field = CombustionField::new(FieldData::with_value(5, 5, 0.05));
        field.fuel.set(2, 2, 1.0);
        field.intensity.set(2, 2, 1.0);
        let mut engine = SpreadEngine::new(
            field,
            FieldData::with_value(5, 5, 1.0),
            WindModel::calm(),
            0.0,
            config,
        );
        let stats = engine.step(&mut SimRng::seeded(4));
        assert_eq!(stats.ignitions, 0);
        assert_eq!(engine.field().burned_area(0.0), 1);
    }

    #[test]
    fn test_active_front_cap() {
        let config = SpreadConfig {
            max_active_fronts: Some(10),
            ..SpreadConfig::default()
        };
        let mut engine = uniform_engine(20, WindModel::calm(), 0.0, config);
        let stats = engine.step(&mut SimRng::seeded(5));
        assert_eq!(stats.active_fronts, 25);
        assert_eq!(stats.sources, 10);

        let uncapped = SpreadConfig {
            max_active_fronts: None,
            ..SpreadConfig::default()
        };
        let mut engine = uniform_engine(20, WindModel::calm(), 0.0, uncapped);
        let stats = engine.step(&mut SimRng::seeded(5));
        assert_eq!(stats.sources, 25);
    }

    #[test]
    fn test_bounds_hold_under_extreme_inputs() {
        let wind = WindModel::resolve("SW", 400.0, 50.0);
        let mut engine = uniform_engine(40, wind, 90.0, SpreadConfig::default());
        let mut rng = SimRng::seeded(6);
        for _ in 0..30 {
            engine.step(&mut rng);
            assert_bounds(engine.field());
        }

        let reverse = WindModel::resolve("E", -500.0, 50.0);
        let mut engine = uniform_engine(40, reverse, -60.0, SpreadConfig::default());
        for _ in 0..30 {
            engine.step(&mut rng);
            assert_bounds(engine.field());
        }
    }

    #[test]
    fn test_fuel_never_increases() {
        let mut engine = uniform_engine(40, WindModel::calm(), 0.0, SpreadConfig::default());
        let mut rng = SimRng::seeded(7);
        let mut previous = engine.field().fuel().clone();
        for _ in 0..20 {
            engine.step(&mut rng);
            let fuel = engine.field().fuel();
            for (before, after) in previous.data.iter().zip(fuel.data.iter()) {
                assert!(after <= before);
            }
            previous = fuel.clone();
        }
        assert_eq!(engine.steps_taken(), 20);
    }

    #[test]
    fn test_validate() {
        assert!(SpreadConfig::default().validate().is_ok());
        let bad_range = SpreadConfig {
            ignition_intensity: (0.8, 0.5),
            ..SpreadConfig::default()
        };
        assert!(bad_range.validate().is_err());
        let zero_cap = SpreadConfig {
            max_active_fronts: Some(0),
            ..SpreadConfig::default()
        };
        assert!(zero_cap.validate().is_err());
    }
}
