//! Free text to simulation parameters

use super::{is_hour_unit, number_with_unit, words};
use crate::core_types::SimulationParameters;
use crate::error::ExtractionError;
use crate::grid::CompassDirection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Parameters named by a request. Anything left `None` keeps its base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterOverrides {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub moisture: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub slope: Option<f64>,
    pub duration: Option<i64>,
    pub origin_latitude: Option<f64>,
    pub origin_longitude: Option<f64>,
}

impl ParameterOverrides {
    /// Whether nothing was named
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge onto `base`.
    #[must_use]
    pub fn apply_to(&self, base: SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            temperature: self.temperature.unwrap_or(base.temperature),
            humidity: self.humidity.unwrap_or(base.humidity),
            moisture: self.moisture.unwrap_or(base.moisture),
            wind_speed: self.wind_speed.unwrap_or(base.wind_speed),
            wind_direction: self
                .wind_direction
                .clone()
                .unwrap_or(base.wind_direction),
            slope: self.slope.unwrap_or(base.slope),
            duration: self.duration.unwrap_or(base.duration),
            origin_latitude: self.origin_latitude.unwrap_or(base.origin_latitude),
            origin_longitude: self.origin_longitude.unwrap_or(base.origin_longitude),
        }
    }
}

/// Turns a free-text request into parameter overrides.
pub trait ParameterExtractor {
    fn extract(&self, prompt: &str) -> Result<ParameterOverrides, ExtractionError>;

    /// Extract and merge onto the default parameters.
    ///
    /// Any extraction failure yields the unmodified defaults.
    fn extract_or_default(&self, prompt: &str) -> SimulationParameters {
        match self.extract(prompt) {
            Ok(overrides) => overrides.apply_to(SimulationParameters::default()),
            Err(e) => {
                warn!("Parameter extraction failed, using defaults: {}", e);
                SimulationParameters::default()
            }
        }
    }
}

/// Shape of a language-model extraction reply
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionReply {
    error: Option<String>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    moisture: Option<f64>,
    wind_speed: Option<f64>,
    #[serde(alias = "windDir")]
    wind_direction: Option<String>,
    slope: Option<f64>,
    duration: Option<f64>,
    time: Option<f64>,
    #[serde(alias = "originLat")]
    origin_latitude: Option<f64>,
    #[serde(alias = "originLon")]
    origin_longitude: Option<f64>,
}

/// Decode a language-model extraction reply.
///
/// Accepts the short names `windDir`, `originLat` and `originLon`. A `time`
/// key takes precedence over `duration`; fractional hours are truncated. A
/// reply carrying an `error` key is rejected.
pub fn parse_extraction_response(json: &str) -> Result<ParameterOverrides, ExtractionError> {
    let reply: ExtractionReply = serde_json::from_str(json)?;
    if let Some(message) = reply.error {
        return Err(ExtractionError::Rejected(message));
    }
    Ok(ParameterOverrides {
        temperature: reply.temperature,
        humidity: reply.humidity,
        moisture: reply.moisture,
        wind_speed: reply.wind_speed,
        wind_direction: reply.wind_direction,
        slope: reply.slope,
        duration: reply.time.or(reply.duration).map(|hours| hours as i64),
        origin_latitude: reply.origin_latitude,
        origin_longitude: reply.origin_longitude,
    })
}

/// Extractor backed by a raw reply source, typically a hosted model.
///
/// The source returns the model's JSON reply or a transport error message.
pub struct ReplyExtractor<F> {
    source: F,
}

impl<F> ReplyExtractor<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    pub fn new(source: F) -> Self {
        Self { source }
    }
}

impl<F> ParameterExtractor for ReplyExtractor<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    fn extract(&self, prompt: &str) -> Result<ParameterOverrides, ExtractionError> {
        let reply = (self.source)(prompt).map_err(ExtractionError::Unavailable)?;
        parse_extraction_response(&reply)
    }
}

/// Offline extractor matching a fixed vocabulary.
///
/// | phrase            | effect                              |
/// |-------------------|-------------------------------------|
/// | `gale`            | wind 40 mph                         |
/// | `bone dry`        | moisture 5 %                        |
/// | `desert`          | humidity 10 %                       |
/// | `heatwave`        | 100 °F, humidity at most 15 %       |
/// | `morning`         | 60 °F, humidity 65 %                |
/// | `mountain`        | slope 30°                           |
/// | `northeast`, `NE` | wind from that compass point        |
/// | `<n> hours`, `<n>h` | duration                          |
/// | `<n> mph`         | wind speed, overriding `gale`       |
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

const COMPASS_WORDS: [(&str, CompassDirection); 8] = [
    ("northeast", CompassDirection::NE),
    ("northwest", CompassDirection::NW),
    ("southeast", CompassDirection::SE),
    ("southwest", CompassDirection::SW),
    ("north", CompassDirection::N),
    ("south", CompassDirection::S),
    ("east", CompassDirection::E),
    ("west", CompassDirection::W),
];

const COMPASS_SUFFIXES: [&str; 5] = ["", "erly", "ern", "ward", "wards"];

fn compass_from_word(word: &str) -> Option<CompassDirection> {
    // Upper-case tokens only, so ordinary words like "e" or "s" never match
    if word.chars().all(|c| c.is_ascii_uppercase()) {
        if let Some(direction) = CompassDirection::parse(word) {
            return Some(direction);
        }
    }
    let word = word.to_ascii_lowercase().replace('-', "");
    COMPASS_WORDS.iter().find_map(|&(base, direction)| {
        word.strip_prefix(base)
            .filter(|rest| COMPASS_SUFFIXES.contains(rest))
            .map(|_| direction)
    })
}

impl ParameterExtractor for KeywordExtractor {
    fn extract(&self, prompt: &str) -> Result<ParameterOverrides, ExtractionError> {
        if prompt.trim().is_empty() {
            return Err(ExtractionError::EmptyPrompt);
        }
        let lower = prompt.to_lowercase();
        let mut overrides = ParameterOverrides::default();

        if lower.contains("morning") {
            overrides.temperature = Some(60.0);
            overrides.humidity = Some(65.0);
        }
        if lower.contains("desert") {
            overrides.humidity = Some(10.0);
        }
        if lower.contains("heatwave") || lower.contains("heat wave") {
            overrides.temperature = Some(100.0);
            overrides.humidity = Some(overrides.humidity.map_or(15.0, |h| h.min(15.0)));
        }
        if lower.contains("bone dry") || lower.contains("bone-dry") {
            overrides.moisture = Some(5.0);
        }
        if lower.contains("gale") {
            overrides.wind_speed = Some(40.0);
        }
        if lower.contains("mountain") {
            overrides.slope = Some(30.0);
        }

        let original = words(prompt);
        overrides.wind_direction = original
            .iter()
            .copied()
            .find_map(compass_from_word)
            .map(|d| d.token().to_string());

        let lowered = words(&lower);
        for i in 0..lowered.len() {
            let Some((value, unit)) = number_with_unit(&lowered, i) else {
                continue;
            };
            if unit == "mph" {
                overrides.wind_speed = Some(value);
            } else if is_hour_unit(unit) {
                overrides.duration = Some(value as i64);
            }
        }

        debug!("Keyword extraction: {:?}", overrides);
        Ok(overrides)
    }
}
