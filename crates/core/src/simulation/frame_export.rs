//! Geocoded frame export
//!
//! Projects burning cells to latitude/longitude around the run's origin:
//!
//! ```text
//! latitude  = origin_lat + (mid - row) × scale
//! longitude = origin_lon + (col - mid) × scale
//! ```
//!
//! Down-sampling keeps a random 30% of cells above the export threshold to
//! bound payload size. It is a visualization concern only: it reads the
//! field and never feeds back into the simulation.

use crate::core_types::{Frame, FramePoint, SimRng};
use crate::error::{SimError, SimResult};
use crate::solver::CombustionField;
use serde::{Deserialize, Serialize};

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Cells at or below this intensity are never exported
    pub intensity_threshold: f64,
    /// Probability of keeping an exportable cell; `None` exports all of them
    pub keep_probability: Option<f64>,
    /// Degrees of latitude/longitude per grid cell
    pub degrees_per_cell: f64,
    /// Decimal places kept in coordinates
    pub coordinate_decimals: u32,
    /// Decimal places kept in intensity
    pub intensity_decimals: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            intensity_threshold: 0.05,
            keep_probability: Some(0.3),
            degrees_per_cell: 0.004,
            coordinate_decimals: 5,
            intensity_decimals: 2,
        }
    }
}

impl ExportConfig {
    /// Export every cell above the threshold
    #[must_use]
    pub fn full_field() -> Self {
        Self {
            keep_probability: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if let Some(p) = self.keep_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "keep_probability must be within [0, 1], got {p}"
                )));
            }
        }
        if !self.degrees_per_cell.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "degrees_per_cell must be finite, got {}",
                self.degrees_per_cell
            )));
        }
        Ok(())
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Projects a combustion field into geocoded frames.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    origin_latitude: f64,
    origin_longitude: f64,
    midpoint: usize,
    config: ExportConfig,
}

impl FrameExporter {
    /// Create an exporter centered on `origin` at grid cell `(midpoint, midpoint)`.
    #[must_use]
    pub fn new(origin_latitude: f64, origin_longitude: f64, midpoint: usize, config: ExportConfig) -> Self {
        Self {
            origin_latitude,
            origin_longitude,
            midpoint,
            config,
        }
    }

    /// Unrounded geographic position of a cell
    #[must_use]
    pub fn project(&self, row: usize, col: usize) -> (f64, f64) {
        let mid = self.midpoint as f64;
        let scale = self.config.degrees_per_cell;
        (
            self.origin_latitude + (mid - row as f64) * scale,
            self.origin_longitude + (col as f64 - mid) * scale,
        )
    }

    /// Geographic bounds `(min_lat, max_lat, min_lon, max_lon)` of a
    /// `grid_size` grid
    #[must_use]
    pub fn grid_bounds(&self, grid_size: usize) -> (f64, f64, f64, f64) {
        let last = grid_size.saturating_sub(1);
        let (north, west) = self.project(0, 0);
        let (south, east) = self.project(last, last);
        (
            south.min(north),
            south.max(north),
            west.min(east),
            west.max(east),
        )
    }

    /// Export one snapshot of the field.
    ///
    /// Cells are visited in row-major order; the keep draw is only made for
    /// cells above the threshold.
    pub fn export(&self, field: &CombustionField, rng: &mut SimRng) -> Frame {
        let cfg = &self.config;
        let intensity = field.intensity();
        let mut frame = Frame::new();

        for (idx, &value) in intensity.as_slice().iter().enumerate() {
            if value <= cfg.intensity_threshold {
                continue;
            }
            if let Some(keep) = cfg.keep_probability {
                if rng.unit() >= keep {
                    continue;
                }
            }
            let (row, col) = (idx / intensity.width, idx % intensity.width);
            let (latitude, longitude) = self.project(row, col);
            frame.push(FramePoint {
                latitude: round_to(latitude, cfg.coordinate_decimals),
                longitude: round_to(longitude, cfg.coordinate_decimals),
                intensity: round_to(value, cfg.intensity_decimals),
            });
        }
        frame
    }

    /// Export settings in use
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }
}
