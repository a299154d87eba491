//! Advisor boundaries
//!
//! Two collaborators sit around the simulation core:
//! - a [`ParameterExtractor`] turns a free-text request into
//!   [`SimulationParameters`](crate::SimulationParameters)
//! - an [`ImpactAnalyst`] answers questions about which assets a run reaches
//!
//! Hosted language-model backends plug in through
//! [`parse_extraction_response`] and [`parse_analysis_response`]; the offline
//! [`KeywordExtractor`] and [`FilterAnalyst`] work without one. Every failure
//! at this boundary becomes a fallback value and never reaches the
//! simulation path.

mod extraction;
mod impact;

pub use extraction::{
    parse_extraction_response, KeywordExtractor, ParameterExtractor, ParameterOverrides,
    ReplyExtractor,
};
pub use impact::{
    assess_impacts, parse_analysis_response, Asset, FilterAnalyst, ImpactAnalyst, ImpactAnswer,
    ImpactFilter, ReplyAnalyst, RiskEntity, DEGRADED_ANSWER,
};

/// Split text into words with surrounding punctuation removed.
///
/// Decimal points inside a word are kept so `2.5` stays one number.
fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '.')
                .trim_end_matches('.')
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Split a word into its leading number and the unit suffix after it.
///
/// `"40mph"` gives `(40.0, "mph")`, `"6"` gives `(6.0, "")`.
fn leading_number(word: &str) -> Option<(f64, &str)> {
    let end = word
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(word.len());
    let value = word[..end].parse::<f64>().ok()?;
    Some((value, &word[end..]))
}

/// Number at `words[i]`, with its unit taken from the suffix or else the
/// following word
fn number_with_unit<'a>(words: &[&'a str], i: usize) -> Option<(f64, &'a str)> {
    let (value, suffix) = leading_number(words[i])?;
    if suffix.is_empty() {
        Some((value, words.get(i + 1).copied().unwrap_or("")))
    } else {
        Some((value, suffix))
    }
}

fn is_hour_unit(unit: &str) -> bool {
    matches!(unit, "h" | "hr" | "hrs" | "hour" | "hours")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_strip_punctuation() {
        assert_eq!(
            words("Gale, from the NW... (2.5 hours)!"),
            vec!["Gale", "from", "the", "NW", "2.5", "hours"]
        );
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("40mph"), Some((40.0, "mph")));
        assert_eq!(leading_number("6"), Some((6.0, "")));
        assert_eq!(leading_number("12h"), Some((12.0, "h")));
        assert_eq!(leading_number("mph"), None);
    }

    #[test]
    fn test_number_with_unit() {
        let w = words("run 12 hours at 30mph");
        assert_eq!(number_with_unit(&w, 1), Some((12.0, "hours")));
        assert_eq!(number_with_unit(&w, 4), Some((30.0, "mph")));
        assert_eq!(number_with_unit(&w, 0), None);
    }
}
