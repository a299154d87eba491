//! Caller-supplied environmental parameters for one simulation run.
//!
//! Values are deliberately not clamped. A run tolerates anything numeric and
//! degrades gracefully; [`SimulationParameters::out_of_range_warnings`] lists
//! what falls outside the nominal ranges so the runner can log it.

use crate::error::SimResult;
use crate::grid::CompassDirection;
use serde::{Deserialize, Serialize};

/// Duration used when a request omits it (hours)
pub const DEFAULT_DURATION_HOURS: i64 = 24;

/// Ignition origin used when nothing else is known (Sacramento valley)
pub const DEFAULT_ORIGIN: (f64, f64) = (38.5, -121.5);

/// Nominal slope range in degrees
pub const NOMINAL_SLOPE_DEGREES: (f64, f64) = (0.0, 45.0);

const fn default_duration() -> i64 {
    DEFAULT_DURATION_HOURS
}

/// Environmental inputs for a run.
///
/// Field names follow the `camelCase` wire shape; the older client names
/// `windDir`, `originLat` and `originLon` are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Air temperature (°F)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Fuel moisture (%)
    pub moisture: f64,
    /// Wind speed (mph)
    pub wind_speed: f64,
    /// Compass token the wind blows from (N, NE, E, SE, S, SW, W, NW)
    #[serde(alias = "windDir")]
    pub wind_direction: String,
    /// Terrain slope (degrees)
    pub slope: f64,
    /// Simulated hours; two exported frames per hour
    #[serde(default = "default_duration")]
    pub duration: i64,
    /// Latitude of the ignition point (degrees)
    #[serde(alias = "originLat")]
    pub origin_latitude: f64,
    /// Longitude of the ignition point (degrees)
    #[serde(alias = "originLon")]
    pub origin_longitude: f64,
}

impl Default for SimulationParameters {
    /// Mild afternoon conditions: 75 °F, 40 % humidity, 15 % fuel moisture,
    /// a 10 mph northerly, flat ground, 24 hours.
    fn default() -> Self {
        Self {
            temperature: 75.0,
            humidity: 40.0,
            moisture: 15.0,
            wind_speed: 10.0,
            wind_direction: "N".to_string(),
            slope: 0.0,
            duration: DEFAULT_DURATION_HOURS,
            origin_latitude: DEFAULT_ORIGIN.0,
            origin_longitude: DEFAULT_ORIGIN.1,
        }
    }
}

impl SimulationParameters {
    /// Decode parameters from a JSON request body.
    ///
    /// Missing required fields are an error; only `duration` has a default.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the ignition origin.
    pub fn with_origin(mut self, latitude: f64, longitude: f64) -> Self {
        self.origin_latitude = latitude;
        self.origin_longitude = longitude;
        self
    }

    /// Set wind speed and direction token.
    pub fn with_wind(mut self, speed_mph: f64, direction: &str) -> Self {
        self.wind_speed = speed_mph;
        self.wind_direction = direction.to_string();
        self
    }

    /// Set the duration in hours.
    pub fn with_duration(mut self, hours: i64) -> Self {
        self.duration = hours;
        self
    }

    /// Set the slope in degrees.
    pub fn with_slope(mut self, degrees: f64) -> Self {
        self.slope = degrees;
        self
    }

    /// Describe every value outside its nominal range.
    ///
    /// An empty list means the parameters are all nominal. None of these
    /// stop a run.
    pub fn out_of_range_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let numeric = [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("moisture", self.moisture),
            ("windSpeed", self.wind_speed),
            ("slope", self.slope),
            ("originLatitude", self.origin_latitude),
            ("originLongitude", self.origin_longitude),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                warnings.push(format!("{name} is not a finite number ({value})"));
            }
        }

        if self.wind_speed < 0.0 {
            warnings.push(format!("windSpeed {} is negative", self.wind_speed));
        }
        for (name, value) in [("humidity", self.humidity), ("moisture", self.moisture)] {
            if !(0.0..=100.0).contains(&value) && value.is_finite() {
                warnings.push(format!("{name} {value} is outside 0-100%"));
            }
        }
        let (min_slope, max_slope) = NOMINAL_SLOPE_DEGREES;
        if !(min_slope..=max_slope).contains(&self.slope) && self.slope.is_finite() {
            warnings.push(format!(
                "slope {} is outside {min_slope}-{max_slope} degrees",
                self.slope
            ));
        }
        if self.origin_latitude.abs() > 90.0 {
            warnings.push(format!(
                "originLatitude {} is outside +/-90",
                self.origin_latitude
            ));
        }
        if self.origin_longitude.abs() > 180.0 {
            warnings.push(format!(
                "originLongitude {} is outside +/-180",
                self.origin_longitude
            ));
        }
        if CompassDirection::parse(&self.wind_direction).is_none() {
            warnings.push(format!(
                "windDirection '{}' is not a compass token, wind bias disabled",
                self.wind_direction
            ));
        }

        warnings
    }
}
