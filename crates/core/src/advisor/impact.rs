//! Asset impact assessment and question answering
//!
//! [`assess_impacts`] turns a run's history into a risk report: for every
//! asset the fire reaches, the simulated hour at which it first comes within
//! range. An [`ImpactAnalyst`] then answers questions over that report.

use super::{leading_number, words};
use crate::core_types::History;
use crate::error::AnalysisError;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed answer returned when analysis fails
pub const DEGRADED_ANSWER: &str = "System malfunction. Unable to analyze risk data.";

/// A point of interest near the fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An asset the fire reaches, with the hour it is first reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntity {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Simulated hours until the first exported point comes within range
    pub time_to_impact: f64,
}

/// Answer to a question about the risk report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnswer {
    pub answer: String,
    /// Entities referenced by the answer
    #[serde(default, alias = "highlight_ids")]
    pub highlight_ids: Vec<u64>,
}

impl ImpactAnswer {
    /// The fixed fallback answer with nothing highlighted
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            answer: DEGRADED_ANSWER.to_string(),
            highlight_ids: Vec::new(),
        }
    }
}

/// Answers questions over a risk report.
pub trait ImpactAnalyst {
    fn analyze(&self, question: &str, entities: &[RiskEntity])
        -> Result<ImpactAnswer, AnalysisError>;

    /// Analyze, replacing any failure with [`ImpactAnswer::degraded`].
    fn analyze_or_degraded(&self, question: &str, entities: &[RiskEntity]) -> ImpactAnswer {
        self.analyze(question, entities).unwrap_or_else(|e| {
            warn!("Impact analysis failed: {}", e);
            ImpactAnswer::degraded()
        })
    }
}

/// Decode a language-model analysis reply.
///
/// Accepts both `highlightIds` and `highlight_ids`.
pub fn parse_analysis_response(json: &str) -> Result<ImpactAnswer, AnalysisError> {
    Ok(serde_json::from_str(json)?)
}

/// Analyst backed by a raw reply source, typically a hosted model.
///
/// The source receives the question and the report and returns the model's
/// JSON reply or a transport error message.
pub struct ReplyAnalyst<F> {
    source: F,
}

impl<F> ReplyAnalyst<F>
where
    F: Fn(&str, &[RiskEntity]) -> Result<String, String>,
{
    pub fn new(source: F) -> Self {
        Self { source }
    }
}

impl<F> ImpactAnalyst for ReplyAnalyst<F>
where
    F: Fn(&str, &[RiskEntity]) -> Result<String, String>,
{
    fn analyze(
        &self,
        question: &str,
        entities: &[RiskEntity],
    ) -> Result<ImpactAnswer, AnalysisError> {
        let reply = (self.source)(question, entities).map_err(AnalysisError::Unavailable)?;
        parse_analysis_response(&reply)
    }
}

/// Restrictions read out of a question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactFilter {
    /// Only entities reached strictly after this many hours
    pub min_hours: Option<f64>,
    /// Only entities reached within this many hours
    pub max_hours: Option<f64>,
    /// Lower-case asset types named in the question
    pub asset_types: FxHashSet<String>,
    /// Lower-case entity names named in the question
    pub names: FxHashSet<String>,
}

const UPPER_BOUND_WORDS: [&str; 5] = ["next", "within", "under", "first", "before"];
const LOWER_BOUND_WORDS: [&str; 3] = ["after", "beyond", "later"];

fn mentions_type(question: &str, asset_type: &str) -> bool {
    if question.contains(asset_type) {
        return true;
    }
    // facility -> facilities
    asset_type
        .strip_suffix('y')
        .is_some_and(|stem| question.contains(&format!("{stem}ies")))
}

impl ImpactFilter {
    /// Read time bounds, asset types and names from a question.
    ///
    /// Types and names are only recognized when they occur in `entities`.
    #[must_use]
    pub fn from_question(question: &str, entities: &[RiskEntity]) -> Self {
        let lower = question.to_lowercase();
        let tokens = words(&lower);
        let mut filter = Self::default();

        for (i, word) in tokens.iter().enumerate() {
            let hours = tokens
                .get(i + 1)
                .copied()
                .and_then(leading_number)
                .map(|(value, _)| value);
            let Some(hours) = hours else {
                continue;
            };
            if UPPER_BOUND_WORDS.contains(word) {
                filter.max_hours = Some(hours);
            } else if LOWER_BOUND_WORDS.contains(word) {
                filter.min_hours = Some(hours);
            }
        }

        for entity in entities {
            let asset_type = entity.asset_type.to_lowercase();
            if !asset_type.is_empty() && mentions_type(&lower, &asset_type) {
                filter.asset_types.insert(asset_type);
            }
            let name = entity.name.to_lowercase();
            if !name.is_empty() && lower.contains(&name) {
                filter.names.insert(name);
            }
        }
        filter
    }

    /// Whether the question placed no restriction at all
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.min_hours.is_none()
            && self.max_hours.is_none()
            && self.asset_types.is_empty()
            && self.names.is_empty()
    }

    #[must_use]
    pub fn matches(&self, entity: &RiskEntity) -> bool {
        if self.min_hours.is_some_and(|min| entity.time_to_impact <= min) {
            return false;
        }
        if self.max_hours.is_some_and(|max| entity.time_to_impact > max) {
            return false;
        }
        if !self.asset_types.is_empty()
            && !self.asset_types.contains(&entity.asset_type.to_lowercase())
        {
            return false;
        }
        self.names.is_empty() || self.names.contains(&entity.name.to_lowercase())
    }
}

/// Offline analyst answering from an [`ImpactFilter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterAnalyst;

impl FilterAnalyst {
    fn summarize(matches: &[&RiskEntity]) -> String {
        match matches {
            [] => "I found no assets matching those criteria.".to_string(),
            [only] => format!("I found 1 match. Including {}.", only.name),
            [first, second] => format!(
                "I found 2 matches. Including {} and {}.",
                first.name, second.name
            ),
            [first, second, rest @ ..] => format!(
                "I found {} matches. Including {} and {} and {} others.",
                matches.len(),
                first.name,
                second.name,
                rest.len()
            ),
        }
    }
}

impl ImpactAnalyst for FilterAnalyst {
    fn analyze(
        &self,
        question: &str,
        entities: &[RiskEntity],
    ) -> Result<ImpactAnswer, AnalysisError> {
        if question.trim().is_empty() {
            return Err(AnalysisError::EmptyQuestion);
        }
        let filter = ImpactFilter::from_question(question, entities);
        debug!("Impact filter: {:?}", filter);

        let mut matches: Vec<&RiskEntity> = entities.iter().filter(|e| filter.matches(e)).collect();
        matches.sort_by(|a, b| a.time_to_impact.total_cmp(&b.time_to_impact));

        Ok(ImpactAnswer {
            answer: Self::summarize(&matches),
            highlight_ids: matches.iter().map(|e| e.id).collect(),
        })
    }
}

/// Build a risk report from a run's history.
///
/// An asset's time to impact is the simulated hour of the first frame with a
/// point within `radius_degrees` of it; frame `k` ends at hour
/// `(k + 1) / steps_per_hour`. Assets never reached are omitted. The report
/// is ordered by time to impact, then id.
pub fn assess_impacts(
    history: &History,
    assets: &[Asset],
    radius_degrees: f64,
    steps_per_hour: usize,
) -> Vec<RiskEntity> {
    let steps_per_hour = steps_per_hour.max(1) as f64;
    let radius_sq = radius_degrees * radius_degrees;

    let mut report: Vec<RiskEntity> = assets
        .par_iter()
        .filter_map(|asset| {
            let first = history.iter().position(|frame| {
                frame.iter().any(|p| {
                    let dlat = p.latitude - asset.latitude;
                    let dlon = p.longitude - asset.longitude;
                    dlat * dlat + dlon * dlon <= radius_sq
                })
            })?;
            Some(RiskEntity {
                id: asset.id,
                name: asset.name.clone(),
                asset_type: asset.asset_type.clone(),
                time_to_impact: (first + 1) as f64 / steps_per_hour,
            })
        })
        .collect();

    report.sort_by(|a, b| {
        a.time_to_impact
            .total_cmp(&b.time_to_impact)
            .then(a.id.cmp(&b.id))
    });
    report
}
