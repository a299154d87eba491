//! Run configuration.
//!
//! [`SimulationParameters`](crate::SimulationParameters) carry what the
//! caller knows about the environment; [`SimulationConfig`] carries how the
//! model runs: grid resolution, timestep, randomness and the named constants
//! of each stage. Defaults reproduce the reference behavior exactly.

use super::frame_export::ExportConfig;
use crate::error::{SimError, SimResult};
use crate::grid::TerrainConfig;
use crate::solver::{QualityPreset, SpreadConfig};
use serde::{Deserialize, Serialize};

/// Model configuration for one or many runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid edge length in cells
    pub grid_size: usize,
    /// Timesteps (and exported frames) per simulated hour
    pub steps_per_hour: usize,
    /// Half-width of the square ignited at the grid center
    pub ignition_half_width: usize,
    /// Fixed seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
    /// Spread transition constants
    pub spread: SpreadConfig,
    /// Terrain distributions
    pub terrain: TerrainConfig,
    /// Frame export settings
    pub export: ExportConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 200,
            steps_per_hour: 2,
            ignition_half_width: 2,
            seed: None,
            spread: SpreadConfig::default(),
            terrain: TerrainConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Default configuration with a fixed seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::default().with_seed(seed)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply a quality preset's active-front cap
    pub fn with_quality(mut self, preset: QualityPreset) -> Self {
        self.spread.max_active_fronts = preset.max_active_fronts();
        self
    }

    /// Export every burning cell instead of a random subset
    pub fn without_downsampling(mut self) -> Self {
        self.export.keep_probability = None;
        self
    }

    /// Decode a configuration; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every nested section.
    pub fn validate(&self) -> SimResult<()> {
        if self.grid_size == 0 {
            return Err(SimError::InvalidConfig("grid_size must be positive".to_string()));
        }
        if self.steps_per_hour == 0 {
            return Err(SimError::InvalidConfig(
                "steps_per_hour must be positive".to_string(),
            ));
        }
        if 2 * self.ignition_half_width + 1 > self.grid_size {
            return Err(SimError::InvalidConfig(format!(
                "ignition square of half-width {} does not fit a {}-cell grid",
                self.ignition_half_width, self.grid_size
            )));
        }
        self.spread.validate()?;
        self.terrain.validate()?;
        self.export.validate()
    }

    /// Number of steps a `duration_hours` run takes.
    ///
    /// Fails with [`SimError::InvalidDuration`] for a non-positive duration
    /// or one too long to count.
    pub fn total_steps(&self, duration_hours: i64) -> SimResult<usize> {
        if duration_hours <= 0 {
            return Err(SimError::InvalidDuration(duration_hours));
        }
        usize::try_from(duration_hours)
            .ok()
            .and_then(|hours| hours.checked_mul(self.steps_per_hour))
            .ok_or(SimError::InvalidDuration(duration_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid_size, 200);
        assert_eq!(config.steps_per_hour, 2);
        assert_eq!(config.spread.max_active_fronts, Some(800));
        assert_eq!(config.export.keep_probability, Some(0.3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_total_steps() {
        let config = SimulationConfig::default();
        assert_eq!(config.total_steps(24).unwrap(), 48);
        assert_eq!(config.total_steps(1).unwrap(), 2);
        assert!(matches!(
            config.total_steps(0),
            Err(SimError::InvalidDuration(0))
        ));
        assert!(matches!(
            config.total_steps(-3),
            Err(SimError::InvalidDuration(-3))
        ));
    }

    #[test]
    fn test_quality_and_downsampling_builders() {
        let config = SimulationConfig::seeded(4)
            .with_quality(QualityPreset::Exhaustive)
            .without_downsampling();
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.spread.max_active_fronts, None);
        assert_eq!(config.export.keep_probability, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimulationConfig::from_json(r#"{"grid_size": 64, "spread": {"wind_gain": 3.0}}"#)
                .unwrap();
        assert_eq!(config.grid_size, 64);
        assert_eq!(config.spread.wind_gain, 3.0);
        assert_eq!(config.spread.base_ignition_probability, 0.25);
        assert_eq!(config.steps_per_hour, 2);
    }

    #[test]
    fn test_validate_rejects_oversized_ignition() {
        let config = SimulationConfig {
            grid_size: 4,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }
}
