//! Static terrain maps generated once per run.
//!
//! Two maps are drawn at setup and never change afterwards:
//! - roughness: spread-probability multipliers, Gaussian around 1.0, that
//!   break an otherwise square burn front into an irregular one
//! - fuel: initial burnable material, near 1.0 with small Gaussian noise
//!
//! ```text
//! roughness[r,c] = clip(N(1.0, 0.3), 0.5, 1.5)
//! fuel[r,c]      = clip(1.0 + N(0, 0.1), 0.5, 1.0)
//! ```

use crate::core_types::SimRng;
use crate::error::{SimError, SimResult};
use crate::solver::FieldData;
use serde::{Deserialize, Serialize};

/// Distribution parameters for the terrain maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Mean roughness multiplier.
    pub roughness_mean: f64,
    /// Standard deviation of roughness.
    pub roughness_std_dev: f64,
    /// Clip range for roughness.
    pub roughness_range: (f64, f64),
    /// Mean initial fuel.
    pub fuel_mean: f64,
    /// Standard deviation of initial fuel.
    pub fuel_std_dev: f64,
    /// Clip range for initial fuel.
    pub fuel_range: (f64, f64),
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            roughness_mean: 1.0,
            roughness_std_dev: 0.3,
            roughness_range: (0.5, 1.5),
            fuel_mean: 1.0,
            fuel_std_dev: 0.1,
            fuel_range: (0.5, 1.0),
        }
    }
}

impl TerrainConfig {
    /// Homogeneous terrain: roughness 1.0 and fuel 1.0 everywhere.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            roughness_std_dev: 0.0,
            fuel_std_dev: 0.0,
            ..Self::default()
        }
    }

    /// Reject distributions that cannot be sampled or clipped.
    pub fn validate(&self) -> SimResult<()> {
        for (name, std_dev) in [
            ("roughness_std_dev", self.roughness_std_dev),
            ("fuel_std_dev", self.fuel_std_dev),
        ] {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {std_dev}"
                )));
            }
        }
        for (name, (lo, hi)) in [
            ("roughness_range", self.roughness_range),
            ("fuel_range", self.fuel_range),
        ] {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(SimError::InvalidConfig(format!(
                    "{name} is inverted or NaN: ({lo}, {hi})"
                )));
            }
        }
        if self.fuel_range.0 < 0.0 || self.fuel_range.1 > 1.0 {
            return Err(SimError::InvalidConfig(format!(
                "fuel_range must lie within [0, 1], got {:?}",
                self.fuel_range
            )));
        }
        Ok(())
    }
}

/// Initial fuel and static roughness for one run.
#[derive(Debug, Clone)]
pub struct TerrainField {
    /// Initial fuel per cell, within the configured fuel range
    pub fuel: FieldData,
    /// Spread multiplier per cell, within the configured roughness range
    pub roughness: FieldData,
}

impl TerrainField {
    /// Draw both maps for a square grid of `grid_size` cells per side.
    ///
    /// Roughness is drawn for the whole grid first, then fuel, so a seed
    /// reproduces both maps exactly.
    ///
    /// # Panics
    ///
    /// Panics if a clip range is inverted; see [`TerrainConfig::validate`].
    pub fn generate(grid_size: usize, config: &TerrainConfig, rng: &mut SimRng) -> Self {
        let (r_lo, r_hi) = config.roughness_range;
        let roughness = FieldData::from_fn(grid_size, grid_size, |_, _| {
            rng.normal(config.roughness_mean, config.roughness_std_dev)
                .clamp(r_lo, r_hi)
        });

        let (f_lo, f_hi) = config.fuel_range;
        let fuel = FieldData::from_fn(grid_size, grid_size, |_, _| {
            rng.normal(config.fuel_mean, config.fuel_std_dev)
                .clamp(f_lo, f_hi)
        });

        Self { fuel, roughness }
    }

    /// Draw both maps with default distributions from an optional seed.
    pub fn generate_seeded(grid_size: usize, seed: Option<u64>) -> Self {
        let mut rng = SimRng::from_seed_option(seed);
        Self::generate(grid_size, &TerrainConfig::default(), &mut rng)
    }

    /// Grid edge length in cells
    #[must_use]
    pub fn size(&self) -> usize {
        self.fuel.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_maps_respect_clip_ranges() {
        let terrain = TerrainField::generate_seeded(200, Some(42));
        assert_eq!(terrain.size(), 200);
        assert_eq!(terrain.fuel.data.len(), 200 * 200);

        let (r_min, r_max) = terrain.roughness.min_max().unwrap();
        assert!(r_min >= 0.5 && r_max <= 1.5, "roughness {r_min}..{r_max}");

        let (f_min, f_max) = terrain.fuel.min_max().unwrap();
        assert!(f_min >= 0.5 && f_max <= 1.0, "fuel {f_min}..{f_max}");
    }

    #[test]
    fn test_roughness_is_centered_on_one() {
        let terrain = TerrainField::generate_seeded(200, Some(3));
        let mean = terrain.roughness.sum() / terrain.roughness.data.len() as f64;
        // Symmetric clipping keeps the mean at 1.0
        assert!((mean - 1.0).abs() < 0.01, "mean roughness {mean}");
    }

    #[test]
    fn test_fuel_mostly_at_cap() {
        // Half the draws land above 1.0 and are clipped to it
        let terrain = TerrainField::generate_seeded(100, Some(9));
        let capped = terrain.fuel.data.iter().filter(|&&v| v == 1.0).count();
        let share = capped as f64 / terrain.fuel.data.len() as f64;
        assert!((share - 0.5).abs() < 0.03, "capped share {share}");
    }

    #[test]
    fn test_seed_reproduces_terrain() {
        let a = TerrainField::generate_seeded(50, Some(77));
        let b = TerrainField::generate_seeded(50, Some(77));
        assert_eq!(a.fuel, b.fuel);
        assert_eq!(a.roughness, b.roughness);
    }

    #[test]
    fn test_uniform_terrain() {
        let mut rng = SimRng::seeded(1);
        let terrain = TerrainField::generate(10, &TerrainConfig::uniform(), &mut rng);
        assert!(terrain.roughness.data.iter().all(|&v| v == 1.0));
        assert!(terrain.fuel.data.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_validate_rejects_bad_distributions() {
        let negative = TerrainConfig {
            fuel_std_dev: -0.1,
            ..TerrainConfig::default()
        };
        assert!(negative.validate().is_err());

        let inverted = TerrainConfig {
            roughness_range: (1.5, 0.5),
            ..TerrainConfig::default()
        };
        assert!(inverted.validate().is_err());

        assert!(TerrainConfig::default().validate().is_ok());
    }
}
